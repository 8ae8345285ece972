//! Export naming helpers.

use chrono::{NaiveDate, Utc};

/// Prefix shared by every exported file name.
pub const EXPORT_PREFIX: &str = "gtm-container-modified";

/// `gtm-container-modified-<YYYY-MM-DD>.json` for `date`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{EXPORT_PREFIX}-{}.json", date.format("%Y-%m-%d"))
}

/// Export file name for today's UTC date.
#[must_use]
pub fn default_export_file_name() -> String {
    export_file_name(Utc::now().date_naive())
}
