//! LLM interaction: one `generateContent` call against the Gemini API.
//!
//! The client is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can change without touching transport or
//! error-mapping logic here. There is no retry loop: any failure is terminal
//! for the current extraction attempt and surfaces to the user, who decides
//! whether to try again.
//!
//! [`LlmClient`] is a trait so tests (and embedders) can substitute a canned
//! responder for the network client.

use crate::config::{ExtractionConfig, API_KEY_ENV};
use crate::error::Pdf2CsvError;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// Options for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_output_tokens: usize,
    /// MIME type hint for the response. Extraction always asks for
    /// "application/json" to favour a bare JSON array.
    pub response_mime_type: &'static str,
}

impl From<&ExtractionConfig> for CompletionOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            response_mime_type: "application/json",
        }
    }
}

/// An external completion collaborator returning raw response text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, Pdf2CsvError>;
}

/// Gemini `generateContent` client over reqwest.
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Construct from config, falling back to the `GEMINI_API_KEY`
    /// environment variable for the key.
    ///
    /// # Errors
    /// [`Pdf2CsvError::ProviderNotConfigured`] when no key is available —
    /// callers should treat this as fatal at startup.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, Pdf2CsvError> {
        let api_key = match &config.api_key {
            Some(k) if !k.is_empty() => k.clone(),
            _ => std::env::var(API_KEY_ENV)
                .ok()
                .filter(|k| !k.is_empty())
                .ok_or(Pdf2CsvError::ProviderNotConfigured)?,
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| Pdf2CsvError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
        })
    }

    /// Build the request body for the Gemini generateContent API.
    fn build_request_body(prompt: &str, options: &CompletionOptions) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "temperature": options.temperature,
                "maxOutputTokens": options.max_output_tokens,
                "responseMimeType": options.response_mime_type,
            },
        })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, Pdf2CsvError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key,
        );

        let body = Self::build_request_body(prompt, options);

        debug!("Gemini request to model={}", self.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Pdf2CsvError::Extraction {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Pdf2CsvError::Extraction {
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        let resp: serde_json::Value =
            response.json().await.map_err(|e| Pdf2CsvError::Extraction {
                message: e.to_string(),
            })?;

        let content = resp["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| Pdf2CsvError::Extraction {
                message: "missing candidates[0].content.parts[0].text".into(),
            })?
            .to_string();

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_structure() {
        let options = CompletionOptions {
            temperature: 0.2,
            max_output_tokens: 8192,
            response_mime_type: "application/json",
        };
        let body = GeminiClient::build_request_body("extract the totals", &options);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "extract the totals");

        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6, "temperature should be ~0.2, got {temp}");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn options_from_config() {
        let config = crate::config::ExtractionConfig::default();
        let options = CompletionOptions::from(&config);
        assert_eq!(options.temperature, 0.2);
        assert_eq!(options.response_mime_type, "application/json");
    }

    #[test]
    fn missing_key_is_fatal() {
        let config = crate::config::ExtractionConfig::builder()
            .api_key("")
            .build()
            .unwrap();
        // Empty explicit key and (in the test environment) no env fallback
        // must refuse to construct the client.
        if std::env::var(API_KEY_ENV).is_err() {
            let err = GeminiClient::from_config(&config).unwrap_err();
            assert!(matches!(err, Pdf2CsvError::ProviderNotConfigured));
        }
    }
}
