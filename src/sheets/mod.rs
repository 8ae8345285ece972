//! Google Sheets values client.
//!
//! One blocking GET against the values-range endpoint per sync. No
//! retries, no timeouts beyond the transport defaults.

use std::fs;
use std::path::{Path, PathBuf};

use gtm_lib::ValueRange;
use reqwest::Url;
use reqwest::blocking::Client;
use thiserror::Error;

pub const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("no sheet ID configured (use --sheet-id, sheets.sheet_id, or GTMX_SHEET_ID)")]
    MissingSheetId,

    #[error("no Sheets API key configured (use --api-key, `gtmx api-key set`, or GTMX_SHEETS_API_KEY)")]
    MissingApiKey,

    #[error("invalid Sheets URL: {0}")]
    InvalidUrl(String),

    #[error("Sheets request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Sheets API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("cannot read sheet file {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid sheet data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for the values-range endpoint.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
}

impl Default for SheetsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetsClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(SHEETS_API)
    }

    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch `range` of `sheet_id`.
    ///
    /// # Errors
    ///
    /// Returns `Request` on transport failure, `Http` on a non-2xx status,
    /// or `Request` if the body is not a value range.
    pub fn fetch_values(
        &self,
        sheet_id: &str,
        range: &str,
        api_key: &str,
    ) -> Result<ValueRange, SheetsError> {
        let url = values_url(&self.base_url, sheet_id, range, api_key)?;
        tracing::info!(sheet_id, range, "fetching sheet values");

        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SheetsError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let values: ValueRange = resp.json()?;
        tracing::debug!(rows = values.values.len(), "sheet values received");
        Ok(values)
    }
}

/// Build `{base}/{sheet_id}/values/{range}?key={api_key}` with the path
/// segments percent-encoded.
///
/// # Errors
///
/// Returns `InvalidUrl` if `base` cannot carry path segments.
pub fn values_url(
    base: &str,
    sheet_id: &str,
    range: &str,
    api_key: &str,
) -> Result<Url, SheetsError> {
    let mut url = Url::parse(base).map_err(|e| SheetsError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| SheetsError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend([sheet_id, "values", range]);
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

/// Read a saved values-range response from disk.
///
/// # Errors
///
/// Returns `File` if the file cannot be read or `Json` if it is malformed.
pub fn load_value_file(path: &Path) -> Result<ValueRange, SheetsError> {
    let text = fs::read_to_string(path).map_err(|source| SheetsError::File {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_url_encodes_range() {
        let url = values_url(SHEETS_API, "sheet123", "Tracker Sheet!A:AZ", "k e y").unwrap();
        let text = url.as_str();
        assert!(text.starts_with(
            "https://sheets.googleapis.com/v4/spreadsheets/sheet123/values/Tracker%20Sheet"
        ));
        assert!(text.ends_with("?key=k+e+y"));
    }

    #[test]
    fn test_values_url_tolerates_trailing_slash() {
        let url = values_url("https://example.test/api/", "s", "A:B", "k").unwrap();
        assert_eq!(url.path(), "/api/s/values/A:B");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            values_url("not a url", "s", "A:B", "k"),
            Err(SheetsError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_load_value_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.json");
        fs::write(&path, r#"{"range": "A1:B2", "values": [["Property"], ["Acme"]]}"#).unwrap();
        let values = load_value_file(&path).unwrap();
        assert_eq!(values.values.len(), 2);

        assert!(matches!(
            load_value_file(&dir.path().join("missing.json")),
            Err(SheetsError::File { .. })
        ));
    }
}
