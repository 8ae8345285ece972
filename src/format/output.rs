use gtm_lib::{ApplyReport, Change, EntityKind, Item};
use serde::Serialize;
use std::path::PathBuf;

/// Entities of one kind for list views.
#[derive(Debug, Clone, Serialize)]
pub struct ItemList<'a> {
    pub kind: EntityKind,
    pub total: usize,
    pub items: Vec<Item<'a>>,
}

/// One entity for the show view.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetails<'a> {
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    pub item: Item<'a>,
}

/// Sync result.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutput {
    pub lookup: String,
    pub changes: Vec<Change>,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ApplyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Outcome of an edit, delete or export.
#[derive(Debug, Clone, Serialize)]
pub struct WriteOutput {
    pub action: &'static str,
    pub count: usize,
    pub output: PathBuf,
}
