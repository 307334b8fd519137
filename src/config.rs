//! Configuration for prompt-driven extraction.
//!
//! All behaviour is controlled through [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across calls and to diff two runs to understand
//! why their outputs differ.

use crate::error::Pdf2CsvError;
use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for a PDF data extraction.
///
/// Built via [`ExtractionConfig::builder()`] or [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2csv::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .model("gemini-2.5-flash")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// LLM model identifier. Default: "gemini-2.5-flash".
    pub model: String,

    /// API key. If None, read from `GEMINI_API_KEY` at client construction.
    /// Absence of both is a fatal startup condition.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Sampling temperature for the completion. Default: 0.2.
    ///
    /// Low temperature keeps the model deterministic and faithful to the
    /// document text, which is what you want for data extraction.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 8192.
    ///
    /// A dense multi-page table can exceed 4 000 output tokens. Setting this
    /// too low silently truncates the JSON array mid-record, which then fails
    /// to parse.
    pub max_output_tokens: usize,

    /// Target width in pixels for preview page renders. Default: 800.
    pub preview_width: u32,

    /// Per-LLM-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            temperature: 0.2,
            max_output_tokens: 8192,
            preview_width: 800,
            api_timeout_secs: 120,
            download_timeout_secs: 120,
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn preview_width(mut self, px: u32) -> Self {
        self.config.preview_width = px.max(100);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Pdf2CsvError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(Pdf2CsvError::InvalidConfig("Model must not be empty".into()));
        }
        if c.max_output_tokens == 0 {
            return Err(Pdf2CsvError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.model, "gemini-2.5-flash");
        assert_eq!(c.temperature, 0.2);
        assert_eq!(c.preview_width, 800);
    }

    #[test]
    fn temperature_is_clamped() {
        let c = ExtractionConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn empty_model_rejected() {
        let err = ExtractionConfig::builder().model("  ").build().unwrap_err();
        assert!(err.to_string().contains("Model"));
    }

    #[test]
    fn preview_width_floor() {
        let c = ExtractionConfig::builder().preview_width(10).build().unwrap();
        assert_eq!(c.preview_width, 100);
    }
}
