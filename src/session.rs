//! The application controller: transient session state and its transitions.
//!
//! ## State machine
//!
//! ```text
//!            select_file           toggle_preview
//!   Idle ───────────────▶ FileSelected ◀─────────▶ Previewing
//!                              │                        │
//!                              └────── begin_extract ───┘
//!                                          │
//!                                      Extracting
//!                                      │        │
//!                            finish(Ok)│        │finish(Err)
//!                                      ▼        ▼
//!                                  Resulted   Failed
//!
//!   any state ── reset ──▶ Idle
//! ```
//!
//! The session owns: the selected file, the current prompt, the current
//! result set (or none), and the error message (or none). Two invariants are
//! enforced structurally: a result set and an error are never both present,
//! and the loading flag is true exactly while a begun extraction has not yet
//! resolved.
//!
//! There is no cancellation of an in-flight extraction. `reset` abandons
//! interest in the eventual result: each begun extraction carries a ticket,
//! and a ticket whose epoch predates the last reset is discarded when it
//! finally resolves.

use crate::config::ExtractionConfig;
use crate::error::Pdf2CsvError;
use crate::extract;
use crate::history::{HistoryStore, PromptHistory};
use crate::output::ResultSet;
use crate::pipeline::llm::LlmClient;
use crate::prompts::DEFAULT_USER_PROMPT;
use tracing::{debug, info};

/// Validation message shown when extraction is requested without a file or
/// prompt.
pub const VALIDATION_MESSAGE: &str = "Please select a PDF file and provide an extraction prompt.";

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Previewing,
    Extracting,
    Resulted,
    Failed,
}

/// The selected PDF: display name plus raw payload.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Handle for one begun extraction. Passed back to
/// [`Session::finish_extract`]; stale tickets (issued before a reset) are
/// silently discarded.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionTicket {
    epoch: u64,
}

/// Transient per-session state and the prompt history it feeds.
pub struct Session<S: HistoryStore> {
    phase: Phase,
    file: Option<SelectedFile>,
    prompt: String,
    records: Option<ResultSet>,
    error: Option<String>,
    history: PromptHistory<S>,
    epoch: u64,
}

impl<S: HistoryStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            phase: Phase::Idle,
            file: None,
            prompt: DEFAULT_USER_PROMPT.to_string(),
            records: None,
            error: None,
            history: PromptHistory::load(store),
            epoch: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// The current result set, if the last extraction succeeded.
    pub fn records(&self) -> Option<&ResultSet> {
        self.records.as_ref()
    }

    /// The current error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True exactly between extraction start and its resolution.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Extracting
    }

    pub fn history(&self) -> &PromptHistory<S> {
        &self.history
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Select a file: clears any previous results, errors, and preview state.
    ///
    /// Rejected while an extraction is in flight.
    pub fn select_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<(), Pdf2CsvError> {
        if self.phase == Phase::Extracting {
            return Err(Pdf2CsvError::Validation(
                "Cannot change the file while extracting.".into(),
            ));
        }
        let name = name.into();
        debug!("File selected: {} ({} bytes)", name, bytes.len());
        self.file = Some(SelectedFile { name, bytes });
        self.records = None;
        self.error = None;
        self.phase = Phase::FileSelected;
        Ok(())
    }

    /// Toggle the page preview. Reversible between FileSelected and
    /// Previewing; a no-op error in any other phase.
    pub fn toggle_preview(&mut self) -> Result<bool, Pdf2CsvError> {
        match self.phase {
            Phase::FileSelected => {
                self.phase = Phase::Previewing;
                Ok(true)
            }
            Phase::Previewing => {
                self.phase = Phase::FileSelected;
                Ok(false)
            }
            _ => Err(Pdf2CsvError::Validation(
                "Preview requires a selected file.".into(),
            )),
        }
    }

    /// Begin an extraction.
    ///
    /// Requires a selected file and a trimmed non-empty prompt; otherwise the
    /// session keeps its phase, records the validation message, and no
    /// network call happens. Re-entrant triggering while already extracting
    /// is rejected.
    pub fn begin_extract(&mut self) -> Result<ExtractionTicket, Pdf2CsvError> {
        if self.phase == Phase::Extracting {
            return Err(Pdf2CsvError::Validation(
                "An extraction is already in progress.".into(),
            ));
        }
        if self.file.is_none() || self.prompt.trim().is_empty() {
            self.records = None;
            self.error = Some(VALIDATION_MESSAGE.to_string());
            return Err(Pdf2CsvError::Validation(VALIDATION_MESSAGE.to_string()));
        }

        self.records = None;
        self.error = None;
        self.phase = Phase::Extracting;
        info!("Extraction started");
        Ok(ExtractionTicket { epoch: self.epoch })
    }

    /// Resolve a begun extraction.
    ///
    /// On success the records are stored, the phase moves to Resulted, and
    /// the prompt is recorded into history. On failure the error message is
    /// surfaced verbatim and the phase moves to Failed. A stale ticket
    /// (issued before a reset) is discarded; returns whether the result was
    /// applied.
    pub fn finish_extract(
        &mut self,
        ticket: ExtractionTicket,
        result: Result<ResultSet, Pdf2CsvError>,
    ) -> bool {
        if self.phase != Phase::Extracting || ticket.epoch != self.epoch {
            debug!("Discarding stale extraction result");
            return false;
        }

        match result {
            Ok(records) => {
                info!("Extraction finished: {} records", records.len());
                self.records = Some(records);
                self.error = None;
                self.phase = Phase::Resulted;
                let prompt = self.prompt.clone();
                self.history.record(&prompt);
            }
            Err(e) => {
                self.records = None;
                self.error = Some(e.to_string());
                self.phase = Phase::Failed;
            }
        }
        true
    }

    /// Run a complete extraction against the selected file.
    ///
    /// Sequences begin → text/LLM/parse → finish, returning the stored
    /// records on success.
    pub async fn run_extraction(
        &mut self,
        client: &dyn LlmClient,
        config: &ExtractionConfig,
    ) -> Result<&ResultSet, Pdf2CsvError> {
        let ticket = self.begin_extract()?;
        // begin_extract guarantees a file is present.
        let bytes = self.file.as_ref().map(|f| f.bytes.clone()).unwrap_or_default();
        let prompt = self.prompt.clone();

        let result = extract::extract(bytes, &prompt, client, config)
            .await
            .map(|output| output.records);
        let failed = result.is_err();
        self.finish_extract(ticket, result);

        if failed {
            Err(Pdf2CsvError::Extraction {
                message: self.error.clone().unwrap_or_default(),
            })
        } else {
            self.records
                .as_ref()
                .ok_or_else(|| Pdf2CsvError::Internal("records missing after success".into()))
        }
    }

    /// Reset to the initial state: file cleared, prompt restored to the
    /// default, results and errors cleared. Abandons interest in any
    /// in-flight extraction.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.file = None;
        self.prompt = DEFAULT_USER_PROMPT.to_string();
        self.records = None;
        self.error = None;
        self.epoch += 1;
    }

    /// Clear the persisted prompt history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;
    use serde_json::json;

    fn session() -> Session<MemoryStore> {
        Session::new(MemoryStore::new())
    }

    fn one_record() -> ResultSet {
        let mut rec = crate::output::Record::new();
        rec.insert("invoice number".into(), json!("INV-1"));
        rec.insert("total".into(), json!("20.00"));
        vec![rec]
    }

    #[test]
    fn starts_idle_with_default_prompt() {
        let s = session();
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.prompt(), DEFAULT_USER_PROMPT);
        assert!(!s.is_loading());
    }

    #[test]
    fn extract_without_file_is_validation_error() {
        let mut s = session();
        s.set_prompt("totals");
        let err = s.begin_extract().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(s.error_message(), Some(VALIDATION_MESSAGE));
        assert_eq!(s.phase(), Phase::Idle, "phase unchanged on validation");
    }

    #[test]
    fn extract_with_blank_prompt_is_validation_error() {
        let mut s = session();
        s.select_file("a.pdf", b"%PDF".to_vec()).unwrap();
        s.set_prompt("   ");
        assert!(s.begin_extract().is_err());
        assert_eq!(s.phase(), Phase::FileSelected);
    }

    #[test]
    fn successful_flow_reaches_resulted_and_records_prompt() {
        let mut s = session();
        s.select_file("invoice.pdf", b"%PDF".to_vec()).unwrap();
        s.set_prompt("invoice number, total");

        let ticket = s.begin_extract().unwrap();
        assert!(s.is_loading());
        assert!(s.finish_extract(ticket, Ok(one_record())));

        assert_eq!(s.phase(), Phase::Resulted);
        assert!(!s.is_loading());
        assert_eq!(s.records().unwrap().len(), 1);
        assert!(s.error_message().is_none());
        assert_eq!(s.history().entries(), ["invoice number, total"]);
    }

    #[test]
    fn failed_flow_surfaces_message_verbatim() {
        let mut s = session();
        s.select_file("a.pdf", b"%PDF".to_vec()).unwrap();
        s.set_prompt("anything");

        let ticket = s.begin_extract().unwrap();
        s.finish_extract(
            ticket,
            Err(Pdf2CsvError::MalformedResponse {
                detail: "oops".into(),
            }),
        );

        assert_eq!(s.phase(), Phase::Failed);
        assert!(s.records().is_none(), "no result set alongside an error");
        assert!(s
            .error_message()
            .unwrap()
            .contains("more specific prompt"));
        assert!(s.history().entries().is_empty(), "failed prompt not recorded");
    }

    #[test]
    fn preview_toggle_is_reversible() {
        let mut s = session();
        s.select_file("a.pdf", b"%PDF".to_vec()).unwrap();
        assert!(s.toggle_preview().unwrap());
        assert_eq!(s.phase(), Phase::Previewing);
        assert!(!s.toggle_preview().unwrap());
        assert_eq!(s.phase(), Phase::FileSelected);
    }

    #[test]
    fn preview_without_file_rejected() {
        let mut s = session();
        assert!(s.toggle_preview().is_err());
    }

    #[test]
    fn reentrant_begin_is_rejected() {
        let mut s = session();
        s.select_file("a.pdf", b"%PDF".to_vec()).unwrap();
        s.set_prompt("x");
        let _ticket = s.begin_extract().unwrap();
        assert!(s.begin_extract().is_err());
        assert!(s.is_loading());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut s = session();
        s.select_file("a.pdf", b"%PDF".to_vec()).unwrap();
        s.set_prompt("custom");
        let ticket = s.begin_extract().unwrap();
        s.finish_extract(ticket, Ok(one_record()));

        s.reset();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.file().is_none());
        assert_eq!(s.prompt(), DEFAULT_USER_PROMPT);
        assert!(s.records().is_none());
        assert!(s.error_message().is_none());
    }

    #[test]
    fn stale_result_after_reset_is_discarded() {
        let mut s = session();
        s.select_file("a.pdf", b"%PDF".to_vec()).unwrap();
        s.set_prompt("x");
        let stale = s.begin_extract().unwrap();

        s.reset();

        // A new extraction begins before the old result arrives.
        s.select_file("b.pdf", b"%PDF".to_vec()).unwrap();
        s.set_prompt("y");
        let _fresh = s.begin_extract().unwrap();

        assert!(!s.finish_extract(stale, Ok(one_record())), "stale discarded");
        assert!(s.is_loading(), "fresh extraction still in flight");
        assert!(s.records().is_none());
    }

    #[test]
    fn selecting_new_file_clears_previous_results() {
        let mut s = session();
        s.select_file("a.pdf", b"%PDF".to_vec()).unwrap();
        s.set_prompt("x");
        let ticket = s.begin_extract().unwrap();
        s.finish_extract(ticket, Ok(one_record()));

        s.select_file("b.pdf", b"%PDF".to_vec()).unwrap();
        assert_eq!(s.phase(), Phase::FileSelected);
        assert!(s.records().is_none());
        assert!(s.error_message().is_none());
    }

    #[test]
    fn file_change_during_extraction_rejected() {
        let mut s = session();
        s.select_file("a.pdf", b"%PDF".to_vec()).unwrap();
        s.set_prompt("x");
        let _ticket = s.begin_extract().unwrap();
        assert!(s.select_file("b.pdf", b"%PDF".to_vec()).is_err());
    }
}
