//! Top-level extraction entry points.
//!
//! One extraction flow is strictly sequential: text extraction precedes the
//! LLM call, which precedes parsing — these are data dependencies, not
//! parallelisable stages. Preview rendering is an independent flow and may
//! overlap in time (see [`crate::pipeline::preview`]).

use crate::config::ExtractionConfig;
use crate::error::Pdf2CsvError;
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::llm::{CompletionOptions, LlmClient};
use crate::pipeline::{input, parse, text};
use crate::prompts;
use std::time::Instant;
use tracing::{debug, info};

/// Extract records from raw PDF bytes with a natural-language prompt.
///
/// # Arguments
/// * `pdf_bytes` — Raw PDF payload (validated as a PDF by the caller or
///   by pdfium itself)
/// * `user_prompt` — What to extract; must be non-empty after trimming
/// * `client` — The completion collaborator
/// * `config` — Extraction configuration
///
/// # Errors
/// * [`Pdf2CsvError::Validation`] for an empty prompt (no work performed)
/// * [`Pdf2CsvError::PdfRead`] when pdfium cannot parse the bytes
/// * [`Pdf2CsvError::Extraction`] for transport/auth failures
/// * [`Pdf2CsvError::MalformedResponse`] when the response is not a JSON array
pub async fn extract(
    pdf_bytes: Vec<u8>,
    user_prompt: &str,
    client: &dyn LlmClient,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2CsvError> {
    let total_start = Instant::now();

    let user_prompt = user_prompt.trim();
    if user_prompt.is_empty() {
        return Err(Pdf2CsvError::Validation(
            "Please provide an extraction prompt.".into(),
        ));
    }

    // ── Step 1: Extract text ─────────────────────────────────────────────
    let extracted = text::extract_text(pdf_bytes).await?;
    info!(
        "Extracted {} chars from {} pages",
        extracted.text.len(),
        extracted.page_count
    );

    // ── Step 2: Call the model ───────────────────────────────────────────
    let full_prompt = prompts::build_extraction_prompt(user_prompt, &extracted.text);
    let options = CompletionOptions::from(config);

    let llm_start = Instant::now();
    let raw = client.complete(&full_prompt, &options).await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    debug!("Model responded with {} chars in {}ms", raw.len(), llm_duration_ms);

    // ── Step 3: Parse the response ───────────────────────────────────────
    let records = parse::parse_records(&raw)?;
    info!("Parsed {} records", records.len());

    Ok(ExtractionOutput {
        records,
        stats: ExtractionStats {
            page_count: extracted.page_count,
            text_chars: extracted.text.len(),
            llm_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        },
    })
}

/// Resolve a path or URL to PDF bytes and extract records from it.
pub async fn extract_from_input(
    input_str: impl AsRef<str>,
    user_prompt: &str,
    client: &dyn LlmClient,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2CsvError> {
    let bytes = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    extract(bytes, user_prompt, client, config).await
}
