//! Error types for the pdf2csv library.
//!
//! Every failure here is terminal for the current attempt: nothing is retried
//! automatically. The user recovers by re-selecting a file, editing the
//! prompt, or triggering extraction again. The one deliberate exception is
//! corrupted prompt history, which [`crate::history`] degrades to an empty
//! list instead of surfacing an error — extraction must never be blocked by
//! history failures.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2csv library.
#[derive(Debug, Error)]
pub enum Pdf2CsvError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Extraction was requested without a file or with an empty prompt.
    /// Shown inline to the user; no network call is made.
    #[error("{0}")]
    Validation(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium could not parse the byte stream as a PDF document.
    #[error("Could not process the PDF file: {detail}\nIt might be corrupted or in an unsupported format.")]
    PdfRead { detail: String },

    /// A preview page could not be rendered. Terminal for that render
    /// attempt only, not for the session.
    #[error("Could not render PDF page {page}: {detail}")]
    PdfRender { page: usize, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No API key was supplied and none was found in the environment.
    /// Fatal at startup — the extraction client cannot be constructed.
    #[error("LLM provider is not configured.\nSet GEMINI_API_KEY or pass an API key explicitly.")]
    ProviderNotConfigured,

    /// The model's response was not parseable JSON, or parsed to something
    /// other than an array.
    #[error("Failed to parse the data from the AI. The format was invalid. Please try a more specific prompt.")]
    MalformedResponse { detail: String },

    /// Transport, auth, or other failure from the LLM collaborator.
    #[error("An error occurred while extracting data: {message}")]
    Extraction { message: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output CSV file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2CsvError {
    /// Errors that the session controller shows inline without logging.
    pub fn is_validation(&self) -> bool {
        matches!(self, Pdf2CsvError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_response_guides_the_user() {
        let e = Pdf2CsvError::MalformedResponse {
            detail: "expected value at line 1".into(),
        };
        assert!(e.to_string().contains("more specific prompt"), "got: {e}");
    }

    #[test]
    fn extraction_carries_collaborator_message() {
        let e = Pdf2CsvError::Extraction {
            message: "HTTP 401: invalid key".into(),
        };
        assert!(e.to_string().contains("invalid key"));
    }

    #[test]
    fn validation_is_flagged() {
        assert!(Pdf2CsvError::Validation("missing file".into()).is_validation());
        assert!(!Pdf2CsvError::ProviderNotConfigured.is_validation());
    }

    #[test]
    fn not_a_pdf_shows_magic_bytes() {
        let e = Pdf2CsvError::NotAPdf {
            path: PathBuf::from("doc.pdf"),
            magic: *b"PK\x03\x04",
        };
        assert!(e.to_string().contains("doc.pdf"));
    }
}
