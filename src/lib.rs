//! # pdf2csv
//!
//! Extract tabular data from PDF documents into CSV using an LLM.
//!
//! ## Why this crate?
//!
//! Tables in PDFs rarely survive mechanical extraction: column boundaries,
//! merged cells, and multi-line descriptions come out scrambled. Instead this
//! crate extracts the raw page text via pdfium and hands it to Gemini with a
//! natural-language prompt describing *what* to pull out ("invoice number,
//! total", "all line items with quantities"). The model returns a JSON array
//! of records which serializes straight to CSV.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL → bytes
//!  ├─ 2. Text     extract page text via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. LLM      one Gemini generateContent call (temperature 0.2, JSON mode)
//!  ├─ 4. Parse    strip code fences, parse JSON array → ResultSet
//!  └─ 5. CSV      first record's fields become headers, values fully quoted
//!
//! Preview         independent flow: render one page to a bitmap, coalesced
//!                 through RenderQueue (latest request wins)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2csv::{extract_from_input, to_csv, ExtractionConfig, GeminiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from GEMINI_API_KEY
//!     let config = ExtractionConfig::default();
//!     let client = GeminiClient::from_config(&config)?;
//!
//!     let output = extract_from_input(
//!         "invoice.pdf",
//!         "invoice number, line items, total",
//!         &client,
//!         &config,
//!     )
//!     .await?;
//!
//!     println!("{}", to_csv(&output.records));
//!     eprintln!(
//!         "{} records from {} pages in {}ms",
//!         output.records.len(),
//!         output.stats.page_count,
//!         output.stats.total_duration_ms
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Session controller
//!
//! Interactive front-ends drive the [`Session`] state machine instead of
//! calling [`extract`] directly: it owns the selected file, the prompt, the
//! current result or error, and records successful prompts into the persisted
//! [`PromptHistory`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2csv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2csv = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod csv;
pub mod error;
pub mod extract;
pub mod history;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, API_KEY_ENV};
pub use csv::{csv_filename, to_csv, write_csv_file};
pub use error::Pdf2CsvError;
pub use extract::{extract, extract_from_input};
pub use history::{
    HistoryStore, JsonFileStore, MemoryStore, PromptHistory, HISTORY_KEY, HISTORY_LIMIT,
};
pub use output::{value_to_text, ExtractionOutput, ExtractionStats, Record, ResultSet};
pub use pipeline::input::source_name;
pub use pipeline::llm::{CompletionOptions, GeminiClient, LlmClient};
pub use pipeline::preview::{render_page, RenderQueue};
pub use prompts::DEFAULT_USER_PROMPT;
pub use session::{ExtractionTicket, Phase, SelectedFile, Session, VALIDATION_MESSAGE};
