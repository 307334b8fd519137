//! Persisted prompt history: a bounded, deduplicated, most-recent-first log.
//!
//! The backing store is an injectable trait rather than ambient global state
//! so tests can substitute an in-memory stand-in. Persistence failures and
//! corrupt data never propagate: a history that cannot be read is simply
//! empty, because extraction must not be blocked by history problems.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Maximum number of prompts kept.
pub const HISTORY_LIMIT: usize = 15;

/// Storage key / file stem for the persisted list.
pub const HISTORY_KEY: &str = "pdf-extractor-prompts";

/// A key-value string store holding the JSON-encoded prompt list.
pub trait HistoryStore: Send + Sync {
    /// Read the raw persisted value, `None` if absent.
    fn read(&self) -> Option<String>;
    /// Persist the raw value. Failures are logged by the caller, not fatal.
    fn write(&self, value: &str) -> std::io::Result<()>;
    /// Remove the persisted value.
    fn delete(&self) -> std::io::Result<()>;
}

impl<S: HistoryStore + ?Sized> HistoryStore for &S {
    fn read(&self) -> Option<String> {
        (**self).read()
    }

    fn write(&self, value: &str) -> std::io::Result<()> {
        (**self).write(value)
    }

    fn delete(&self) -> std::io::Result<()> {
        (**self).delete()
    }
}

/// File-backed store: one JSON file at a fixed path.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the platform data directory,
    /// e.g. `~/.local/share/pdf2csv/pdf-extractor-prompts.json`.
    pub fn default_location() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("pdf2csv").join(format!("{HISTORY_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn read(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn write(&self, value: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, value)
    }

    fn delete(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-memory store for tests and embedders without a filesystem.
#[derive(Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryStore {
    fn read(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    fn write(&self, value: &str) -> std::io::Result<()> {
        *self.value.lock().unwrap() = Some(value.to_string());
        Ok(())
    }

    fn delete(&self) -> std::io::Result<()> {
        *self.value.lock().unwrap() = None;
        Ok(())
    }
}

/// The prompt history itself: insertion-ordered, most-recent-first,
/// duplicates suppressed, bounded to [`HISTORY_LIMIT`] entries.
pub struct PromptHistory<S: HistoryStore> {
    store: S,
    entries: Vec<String>,
}

impl<S: HistoryStore> PromptHistory<S> {
    /// Load history from the store. Missing or unparseable persisted data
    /// is treated as absent, never as an error.
    pub fn load(store: S) -> Self {
        let entries = match store.read() {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => list,
                Err(e) => {
                    warn!("Discarding corrupt prompt history: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        debug!("Loaded {} prompt history entries", entries.len());
        Self { store, entries }
    }

    /// The current entries, most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Record a prompt: trim, skip if empty or already present, otherwise
    /// prepend, truncate to the limit, and persist.
    pub fn record(&mut self, prompt: &str) {
        let trimmed = prompt.trim();
        if trimmed.is_empty() || self.entries.iter().any(|e| e == trimmed) {
            return;
        }

        self.entries.insert(0, trimmed.to_string());
        self.entries.truncate(HISTORY_LIMIT);
        self.persist();
    }

    /// Empty the history and remove the persisted value.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.store.delete() {
            warn!("Failed to clear persisted prompt history: {}", e);
        }
    }

    fn persist(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(raw) => {
                if let Err(e) = self.store.write(&raw) {
                    warn!("Failed to persist prompt history: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode prompt history: {}", e),
        }
    }
}
