//! Error types for `gtm-lib`.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for gtm-lib operations.
#[derive(Error, Debug)]
pub enum GtmError {
    // === Container Errors ===
    /// The input document is not a parseable GTM export.
    #[error("Container parse error: {reason}")]
    ContainerParse { reason: String },

    /// Entity kind string did not name a known kind.
    #[error("Invalid entity kind: {kind}")]
    InvalidKind { kind: String },

    /// Status filter string did not name a known filter.
    #[error("Invalid status filter: {status}")]
    InvalidStatusFilter { status: String },

    // === Entity Errors ===
    /// Entity with the specified ID was not found.
    #[error("{kind} not found: {id}")]
    ItemNotFound { kind: String, id: String },

    /// Positional lookup fell outside the collection.
    #[error("Invalid {kind} index {index} (collection has {len} items)")]
    IndexOutOfRange {
        kind: String,
        index: usize,
        len: usize,
    },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    // === Reconciliation Errors ===
    /// No spreadsheet row matched the property lookup.
    #[error("Property \"{lookup}\" not found in sheet")]
    PropertyNotFound { lookup: String },

    // === I/O Errors ===
    /// File not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// No file path is associated with the store.
    #[error("Storage error: {0}")]
    Storage(String),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Operational Errors ===
    /// Nothing matched the request.
    #[error("Nothing to do: {reason}")]
    NothingToDo { reason: String },
}

impl GtmError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ItemNotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Whether the error is a non-fatal status the caller should report
    /// and continue from, rather than abort on.
    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(
            self,
            Self::PropertyNotFound { .. } | Self::NothingToDo { .. }
        )
    }
}

/// Result type using `GtmError`.
pub type Result<T> = std::result::Result<T, GtmError>;
