//! `gtm-lib` — In-process GTM container editing and reconciliation library.
//!
//! Loads a Google Tag Manager container export, presents its tags,
//! triggers, folders and (normalized, deduplicated) variables, and
//! reconciles variable/tag values against one row of a tracking
//! spreadsheet. Unknown fields survive every load/edit/save cycle.
//!
//! # Quick Start
//!
//! ```no_run
//! use gtm_lib::{ContainerStore, EntityKind, LookupKey, locate_row};
//!
//! // Load an export
//! let mut store = ContainerStore::open("container.json").unwrap();
//!
//! // Browse
//! let variables = store.items(EntityKind::Variable);
//! println!("{} variables", variables.len());
//!
//! // Reconcile against sheet rows (header row first)
//! let rows = vec![
//!     vec!["Property Name".to_string(), "GA4 Measurement ID".to_string()],
//!     vec!["Acme Lofts".to_string(), "G-NEW".to_string()],
//! ];
//! let row = locate_row(&rows, &LookupKey::Name("acme".into())).unwrap();
//! let changes = store.build_changes(&row);
//! store.apply_changes(changes);
//!
//! // Save back
//! store.save().unwrap();
//! ```

pub mod apply;
pub mod changeset;
pub mod document;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod query;
pub mod sheet;
pub mod store;
pub mod util;

pub use apply::{ApplyOutcome, ApplyReport, VariableWriteStrategy};
pub use changeset::{Change, ChangeTarget};
pub use error::{GtmError, Result};
pub use matcher::{MatchMode, find_by_pattern, find_by_specific_pattern};
pub use model::{Container, ContainerVersion, Entity, EntityKind, VariableSource};
pub use normalize::{NormalizedVariable, VariableKey, normalize_variables};
pub use query::{BulkEdit, ContainerSettings, EntityFilter, ItemRef, ItemUpdate, StatusFilter};
pub use sheet::{LookupKey, SheetRow, ValueRange, clean_url, locate_row};
pub use store::{ContainerStore, ContainerSummary, Item};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
