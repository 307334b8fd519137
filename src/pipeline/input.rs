//! Input resolution: normalise a user-supplied path or URL to PDF bytes.
//!
//! Everything downstream (text extraction, preview rendering) works on an
//! in-memory byte buffer, so resolution always produces `Vec<u8>`. The `%PDF`
//! magic bytes are validated here so callers get a meaningful error rather
//! than a pdfium parse failure on, say, a ZIP file.

use crate::error::Pdf2CsvError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to raw PDF bytes.
///
/// If the input is a URL, download it; otherwise read the local file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<Vec<u8>, Pdf2CsvError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

/// Read a local file, validating existence, permissions, and PDF magic bytes.
async fn read_local(path_str: &str) -> Result<Vec<u8>, Pdf2CsvError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2CsvError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2CsvError::FileNotFound { path });
        }
    };

    check_magic(&bytes, &path)?;
    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

/// Download a URL and return the body as PDF bytes.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, Pdf2CsvError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Pdf2CsvError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Pdf2CsvError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(Pdf2CsvError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Pdf2CsvError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .to_vec();

    check_magic(&bytes, &PathBuf::from(url))?;
    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes)
}

fn check_magic(bytes: &[u8], path: &std::path::Path) -> Result<(), Pdf2CsvError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(Pdf2CsvError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Derive the original file's base name from a path or URL, for naming the
/// CSV download.
pub fn source_name(input: &str) -> String {
    let candidate = if is_url(input) {
        input
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("document.pdf")
    } else {
        std::path::Path::new(input)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
    };
    candidate.to_string()
}
