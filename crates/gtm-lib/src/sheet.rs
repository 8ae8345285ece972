//! Spreadsheet row lookup.
//!
//! Sheet data arrives as raw rows where row 0 is the header. A property
//! is located either by name (substring of the "property" column) or by
//! URL (canonicalized, mutual containment against the website/URL column).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Response body of the Sheets values-range endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// How to find the property row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Case-insensitive substring of the property-name column.
    Name(String),
    /// Website URL, compared after [`clean_url`].
    Url(String),
}

impl LookupKey {
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Name(v) | Self::Url(v) => v,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Url(_) => "url",
        }
    }

    fn is_search_header(&self, header: &str) -> bool {
        let header = header.to_lowercase();
        match self {
            Self::Name(_) => header.contains("property"),
            Self::Url(_) => header.contains("website") || header.contains("url"),
        }
    }

    fn matches_cell(&self, cell: &str) -> bool {
        match self {
            Self::Name(v) => cell.to_lowercase().contains(&v.to_lowercase()),
            Self::Url(v) => {
                let wanted = clean_url(v);
                let found = clean_url(cell);
                found.contains(&wanted) || wanted.contains(&found)
            }
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// One data row keyed by header text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetRow {
    headers: Vec<String>,
    cells: HashMap<String, String>,
}

impl SheetRow {
    /// Zip `headers` against `row`; missing trailing cells become "".
    #[must_use]
    pub fn from_parts(headers: &[String], row: &[String]) -> Self {
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect();
        Self {
            headers: headers.to_vec(),
            cells,
        }
    }

    /// Cell under `header`, if the column exists.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }

    /// Header names in sheet order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

/// Canonical URL form: lowercase, no scheme, no leading `www.`, no
/// single trailing slash.
#[must_use]
pub fn clean_url(url: &str) -> String {
    let lower = url.to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    rest.strip_suffix('/').unwrap_or(rest).to_string()
}

/// Find the first data row matching `key`.
///
/// Returns `None` when there is no data row, when no header qualifies as
/// the search column, or when nothing matches.
#[must_use]
pub fn locate_row(rows: &[Vec<String>], key: &LookupKey) -> Option<SheetRow> {
    let (headers, data) = match rows {
        [headers, data @ ..] if !data.is_empty() => (headers, data),
        _ => return None,
    };

    let Some(column) = headers.iter().position(|h| key.is_search_header(h)) else {
        tracing::debug!(lookup = key.kind(), ?headers, "search column not found");
        return None;
    };
    tracing::debug!(column, header = %headers[column], "searching sheet column");

    data.iter()
        .find(|row| {
            row.get(column)
                .filter(|cell| !cell.is_empty())
                .is_some_and(|cell| key.matches_cell(cell))
        })
        .map(|row| SheetRow::from_parts(headers, row))
}
