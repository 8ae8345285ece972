//! Output formatting for `gtmx`.
//!
//! Supports both human-readable text output and machine-parseable JSON
//! (`--json`). Diagnostics always go to stderr.
//!
//! # JSON Output Types
//!
//! - [`ItemList`] - Filtered entities of one kind (list)
//! - [`ItemDetails`] - One entity with its folder name (show)
//! - [`SyncOutput`] - Located row, proposed changes and apply outcome (sync)
//! - [`WriteOutput`] - Result of a mutating command

mod output;
mod text;

pub use output::{ItemDetails, ItemList, SyncOutput, WriteOutput};
pub use text::{
    format_change, format_item_line, format_status_badge, format_summary, truncate_to_width,
};
