//! CSV serialization of extracted records.
//!
//! Headers come from the *first* record's field names in insertion order;
//! later records with a divergent field set are projected onto those headers
//! (missing fields become empty). Inconsistent schemas are silently resolved
//! by the first record, not an error.
//!
//! Quoting is a safe superset: every data field is wrapped in double quotes
//! regardless of content, with embedded quotes doubled. The header row is
//! emitted unquoted.

use crate::error::Pdf2CsvError;
use crate::output::{value_to_text, ResultSet};
use std::path::Path;

/// Serialize records to CSV text.
///
/// Returns an empty string for an empty result set — "no data to export" is
/// the caller's no-op case, not an error.
pub fn to_csv(records: &ResultSet) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();

    let mut rows: Vec<String> = Vec::with_capacity(records.len() + 1);
    rows.push(headers.join(","));

    for record in records {
        let fields: Vec<String> = headers
            .iter()
            .map(|h| {
                let text = record.get(*h).map(value_to_text).unwrap_or_default();
                format!("\"{}\"", text.replace('"', "\"\""))
            })
            .collect();
        rows.push(fields.join(","));
    }

    rows.join("\n")
}

/// Derive the download filename: strip the source's extension, append `_data.csv`.
pub fn csv_filename(source_name: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("data");
    format!("{}_data.csv", stem)
}

/// Write CSV to a file atomically (temp file + rename) so a crash never
/// leaves a partial download behind.
pub async fn write_csv_file(
    records: &ResultSet,
    output_path: impl AsRef<Path>,
) -> Result<(), Pdf2CsvError> {
    let path = output_path.as_ref();
    let csv = to_csv(records);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Pdf2CsvError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("csv.tmp");
    tokio::fs::write(&tmp_path, &csv)
        .await
        .map_err(|e| Pdf2CsvError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Pdf2CsvError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Record;
    use serde_json::json;

    fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
        let mut map = Record::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), v.clone());
        }
        map
    }

    #[test]
    fn header_row_uses_first_record_field_order() {
        let records = vec![
            record(&[("invoice number", json!("INV-1")), ("total", json!("20.00"))]),
        ];
        let csv = to_csv(&records);
        assert_eq!(csv, "invoice number,total\n\"INV-1\",\"20.00\"");
    }

    #[test]
    fn line_count_is_records_plus_header() {
        let records = vec![
            record(&[("a", json!("1"))]),
            record(&[("a", json!("2"))]),
            record(&[("a", json!("3"))]),
        ];
        assert_eq!(to_csv(&records).lines().count(), 4);
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let records = vec![record(&[("quote", json!("He said \"hi\""))])];
        let csv = to_csv(&records);
        assert!(csv.contains("\"He said \"\"hi\"\"\""), "got: {csv}");
    }

    #[test]
    fn commas_and_newlines_survive_under_full_quoting() {
        let records = vec![record(&[("desc", json!("a, b\nc"))])];
        let csv = to_csv(&records);
        assert_eq!(csv, "desc\n\"a, b\nc\"");
    }

    #[test]
    fn divergent_schema_projects_onto_first_headers() {
        let records = vec![
            record(&[("a", json!("1")), ("b", json!("2"))]),
            record(&[("a", json!("3")), ("c", json!("ignored"))]),
        ];
        let csv = to_csv(&records);
        assert_eq!(csv, "a,b\n\"1\",\"2\"\n\"3\",\"\"");
    }

    #[test]
    fn non_string_values_are_coerced() {
        let records = vec![record(&[("n", json!(42)), ("ok", json!(true))])];
        assert_eq!(to_csv(&records), "n,ok\n\"42\",\"true\"");
    }

    #[test]
    fn empty_result_set_is_empty_string() {
        assert_eq!(to_csv(&Vec::new()), "");
    }

    #[test]
    fn filename_derivation() {
        assert_eq!(csv_filename("invoice.pdf"), "invoice_data.csv");
        assert_eq!(csv_filename("report.2024.pdf"), "report.2024_data.csv");
        assert_eq!(csv_filename("noext"), "noext_data.csv");
        assert_eq!(csv_filename(""), "data_data.csv");
    }

    #[tokio::test]
    async fn atomic_write_produces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![record(&[("a", json!("1"))])];

        write_csv_file(&records, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "a\n\"1\"");
        assert!(!dir.path().join("out.csv.tmp").exists());
    }
}
