//! Response parsing: turn raw model output into a [`ResultSet`].
//!
//! Even with `responseMimeType: "application/json"` the model occasionally
//! wraps its answer in Markdown code fences despite the prompt saying not to.
//! Stripping the fences here, rather than tightening the prompt further,
//! keeps the prompt focused on *what to extract* and makes the cleanup
//! independently testable.

use crate::error::Pdf2CsvError;
use crate::output::{Record, ResultSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").unwrap());

/// Strip surrounding ```json … ``` or ``` … ``` fences, if present.
fn strip_code_fences(input: &str) -> &str {
    let trimmed = input.trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps.get(1).map(|m| m.as_str().trim()).unwrap_or(trimmed),
        None => trimmed,
    }
}

/// Parse the model's raw response text into records.
///
/// # Errors
/// [`Pdf2CsvError::MalformedResponse`] when the cleaned text is not valid
/// JSON or parses to something other than an array. An empty array is a
/// valid "no data found" outcome, not an error.
pub fn parse_records(raw: &str) -> Result<ResultSet, Pdf2CsvError> {
    let cleaned = strip_code_fences(raw);

    let value: Value =
        serde_json::from_str(cleaned).map_err(|e| Pdf2CsvError::MalformedResponse {
            detail: e.to_string(),
        })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(Pdf2CsvError::MalformedResponse {
                detail: format!("API did not return a JSON array (got {})", kind_name(&other)),
            });
        }
    };

    let records: ResultSet = items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => map,
            other => {
                // Non-object elements are wrapped under a single "value"
                // field so one odd element does not lose the whole result.
                let mut map = Record::new();
                map.insert("value".to_string(), other);
                map
            }
        })
        .collect();

    Ok(records)
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_json_is_cleaned() {
        let raw = " ```json\n[{\"a\":\"1\"}]\n``` ";
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["a"], json!("1"));
    }

    #[test]
    fn bare_fences_are_cleaned() {
        let raw = "```\n[]\n```";
        assert!(parse_records(raw).unwrap().is_empty());
    }

    #[test]
    fn unfenced_json_passes_through() {
        let records = parse_records(r#"[{"x":"y"},{"x":"z"}]"#).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn empty_array_is_valid_no_data() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn not_json_is_malformed() {
        let err = parse_records("not json").unwrap_err();
        assert!(matches!(err, Pdf2CsvError::MalformedResponse { .. }));
    }

    #[test]
    fn non_array_is_malformed() {
        let err = parse_records(r#"{"a":"1"}"#).unwrap_err();
        match err {
            Pdf2CsvError::MalformedResponse { detail } => {
                assert!(detail.contains("JSON array"), "got: {detail}");
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn field_order_survives_parsing() {
        let records = parse_records(r#"[{"invoice number":"INV-1","total":"20.00"}]"#).unwrap();
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, ["invoice number", "total"]);
    }
}
