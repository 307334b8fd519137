//! Result types: extracted records and per-extraction statistics.
//!
//! The field set of a [`Record`] is decided by the model at runtime, not
//! fixed ahead of time, so a record is an *ordered* map from field name to
//! JSON value rather than a struct. Insertion order matters: CSV headers are
//! taken from the first record's fields in the order the model emitted them
//! (serde_json is built with `preserve_order` for exactly this reason).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One extracted item: field-name → value pairs in emission order.
pub type Record = serde_json::Map<String, Value>;

/// The ordered collection of records from one extraction.
///
/// An empty result set is a valid "no data found" outcome, distinct from a
/// failure.
pub type ResultSet = Vec<Record>;

/// Result of a complete extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Records returned by the model, in response order.
    pub records: ResultSet,
    /// Timing and size statistics.
    pub stats: ExtractionStats,
}

/// Statistics for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of pages in the source PDF.
    pub page_count: usize,
    /// Characters of text extracted from the PDF.
    pub text_chars: usize,
    /// Wall-clock time of the LLM call.
    pub llm_duration_ms: u64,
    /// Total wall-clock time including text extraction.
    pub total_duration_ms: u64,
}

/// Coerce a record value to its textual representation for CSV output.
///
/// Strings pass through without JSON quoting; everything else uses its JSON
/// rendering (`null` → `"null"`, numbers and booleans as printed).
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_preserves_insertion_order() {
        let rec: Record = serde_json::from_str(r#"{"z":"1","a":"2","m":"3"}"#).unwrap();
        let keys: Vec<&String> = rec.keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn value_coercion() {
        assert_eq!(value_to_text(&json!("He said \"hi\"")), "He said \"hi\"");
        assert_eq!(value_to_text(&json!(20.5)), "20.5");
        assert_eq!(value_to_text(&json!(true)), "true");
        assert_eq!(value_to_text(&Value::Null), "null");
    }
}
