//! Container store.
//!
//! Owns one loaded container for the length of a session and exposes the
//! read, edit, delete and reconciliation API over it. Every collection is
//! read through [`ContainerStore::items`], so counts, listings and edit
//! targets always agree with the normalized variable view.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::apply::{ApplyReport, apply_changes};
use crate::changeset::{Change, build_changes};
use crate::document;
use crate::error::{GtmError, Result};
use crate::model::{
    Container, ContainerVersion, Entity, EntityKind, Folder, Parameter, Tag, Trigger, Variable,
    VariableSource, value_as_string,
};
use crate::normalize::{NormalizedVariable, normalize_variables, unified_id, variable_at_mut};
use crate::query::{BulkEdit, ContainerSettings, EntityFilter, ItemRef, ItemUpdate, filter_items};
use crate::sheet::SheetRow;

const UNKNOWN: &str = "Unknown";
const UNNAMED_CONTAINER: &str = "Unnamed Container";
const UNKNOWN_FOLDER: &str = "Unknown Folder";

/// One entity of any kind, borrowed from the store.
#[derive(Debug, Clone, Copy)]
pub enum Item<'a> {
    Tag(&'a Tag),
    Trigger(&'a Trigger),
    Variable(NormalizedVariable<'a>),
    Folder(&'a Folder),
}

impl Item<'_> {
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Tag(_) => EntityKind::Tag,
            Self::Trigger(_) => EntityKind::Trigger,
            Self::Variable(_) => EntityKind::Variable,
            Self::Folder(_) => EntityKind::Folder,
        }
    }

    /// Parent folder assignment, if any.
    #[must_use]
    pub fn parent_folder_id(&self) -> Option<&str> {
        match self {
            Self::Tag(t) => t.parent_folder_id.as_deref(),
            Self::Trigger(t) => t.parent_folder_id.as_deref(),
            Self::Variable(v) => v.variable.parent_folder_id.as_deref(),
            Self::Folder(_) => None,
        }
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        match self {
            Self::Tag(t) => t.notes.as_deref(),
            Self::Trigger(t) => t.notes.as_deref(),
            Self::Variable(v) => v.variable.notes.as_deref(),
            Self::Folder(f) => f.notes.as_deref(),
        }
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        let params = match self {
            Self::Tag(t) => &t.parameter,
            Self::Trigger(t) => &t.parameter,
            Self::Variable(v) => &v.variable.parameter,
            Self::Folder(_) => return &[],
        };
        params.as_deref().unwrap_or_default()
    }

    /// Raw JSON of the entity; variables carry `variableType`/`variableId`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Tag(t) => serde_json::to_value(t).unwrap_or_default(),
            Self::Trigger(t) => serde_json::to_value(t).unwrap_or_default(),
            Self::Variable(v) => v.to_json(),
            Self::Folder(f) => serde_json::to_value(f).unwrap_or_default(),
        }
    }
}

impl Entity for Item<'_> {
    fn name(&self) -> Option<&str> {
        match self {
            Self::Tag(t) => t.name(),
            Self::Trigger(t) => t.name(),
            Self::Variable(v) => v.name(),
            Self::Folder(f) => f.name(),
        }
    }

    fn entity_type(&self) -> Option<&str> {
        match self {
            Self::Tag(t) => t.entity_type(),
            Self::Trigger(t) => t.entity_type(),
            Self::Variable(v) => v.entity_type(),
            Self::Folder(f) => f.entity_type(),
        }
    }

    fn id(&self) -> Option<&str> {
        match self {
            Self::Tag(t) => t.id(),
            Self::Trigger(t) => t.id(),
            Self::Variable(v) => v.id(),
            Self::Folder(f) => f.id(),
        }
    }

    fn paused(&self) -> bool {
        matches!(self, Self::Tag(t) if t.is_paused())
    }
}

impl Serialize for Item<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Tag(t) => t.serialize(serializer),
            Self::Trigger(t) => t.serialize(serializer),
            Self::Variable(v) => v.to_json().serialize(serializer),
            Self::Folder(f) => f.serialize(serializer),
        }
    }
}

/// Header information and entity counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    pub name: String,
    pub container_id: String,
    pub version_id: String,
    pub account_id: String,
    pub export_format: String,
    pub tags: usize,
    pub triggers: usize,
    pub variables: usize,
    pub folders: usize,
}

/// Mutable access to the fields shared by every entity kind.
trait Editable {
    fn name_mut(&mut self) -> &mut Option<String>;
    fn notes_mut(&mut self) -> &mut Option<String>;
    fn parent_folder_mut(&mut self) -> Option<&mut Option<String>>;
    fn parameters_mut(&mut self) -> Option<&mut Vec<Parameter>>;
    fn paused_mut(&mut self) -> Option<&mut Option<bool>> {
        None
    }
}

impl Editable for Tag {
    fn name_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }
    fn notes_mut(&mut self) -> &mut Option<String> {
        &mut self.notes
    }
    fn parent_folder_mut(&mut self) -> Option<&mut Option<String>> {
        Some(&mut self.parent_folder_id)
    }
    fn parameters_mut(&mut self) -> Option<&mut Vec<Parameter>> {
        self.parameter.as_mut()
    }
    fn paused_mut(&mut self) -> Option<&mut Option<bool>> {
        Some(&mut self.paused)
    }
}

impl Editable for Trigger {
    fn name_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }
    fn notes_mut(&mut self) -> &mut Option<String> {
        &mut self.notes
    }
    fn parent_folder_mut(&mut self) -> Option<&mut Option<String>> {
        Some(&mut self.parent_folder_id)
    }
    fn parameters_mut(&mut self) -> Option<&mut Vec<Parameter>> {
        self.parameter.as_mut()
    }
}

impl Editable for Variable {
    fn name_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }
    fn notes_mut(&mut self) -> &mut Option<String> {
        &mut self.notes
    }
    fn parent_folder_mut(&mut self) -> Option<&mut Option<String>> {
        Some(&mut self.parent_folder_id)
    }
    fn parameters_mut(&mut self) -> Option<&mut Vec<Parameter>> {
        self.parameter.as_mut()
    }
}

impl Editable for Folder {
    fn name_mut(&mut self) -> &mut Option<String> {
        &mut self.name
    }
    fn notes_mut(&mut self) -> &mut Option<String> {
        &mut self.notes
    }
    fn parent_folder_mut(&mut self) -> Option<&mut Option<String>> {
        None
    }
    fn parameters_mut(&mut self) -> Option<&mut Vec<Parameter>> {
        None
    }
}

/// In-memory GTM container.
///
/// Use `open()` to load from a file and `save()` to persist back.
#[derive(Debug, Clone, Default)]
pub struct ContainerStore {
    container: Container,
    path: Option<PathBuf>,
    dirty: bool,
}

impl ContainerStore {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a store with an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_container(container: Container) -> Self {
        Self {
            container,
            path: None,
            dirty: false,
        }
    }

    /// Parse a container from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ContainerParse` if the text is malformed.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self::from_container(document::parse(text)?))
    }

    /// Open and load a container file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut store = Self::from_container(document::load(path)?);
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Save to the file that was opened.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if no file path is set, or `Io` on write failure.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| GtmError::Storage("No file path set; use save_to()".to_string()))?;
        self.save_to(path)
    }

    /// Save to a specific file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` on write failure.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        document::save(path.as_ref(), &self.container)
    }

    /// Indented JSON of the whole container.
    ///
    /// # Errors
    ///
    /// Returns `Json` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        document::to_pretty_json(&self.container)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    #[must_use]
    pub fn container_version(&self) -> Option<&ContainerVersion> {
        self.container.container_version.as_ref()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// All items of `kind`, in document order. Variables are normalized.
    #[must_use]
    pub fn items(&self, kind: EntityKind) -> Vec<Item<'_>> {
        let Some(cv) = self.container_version() else {
            return Vec::new();
        };
        match kind {
            EntityKind::Tag => cv.tags().iter().map(Item::Tag).collect(),
            EntityKind::Trigger => cv.triggers().iter().map(Item::Trigger).collect(),
            EntityKind::Variable => normalize_variables(Some(cv))
                .into_iter()
                .map(Item::Variable)
                .collect(),
            EntityKind::Folder => cv.folders().iter().map(Item::Folder).collect(),
        }
    }

    /// Normalized variables.
    #[must_use]
    pub fn variables(&self) -> Vec<NormalizedVariable<'_>> {
        normalize_variables(self.container_version())
    }

    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.items(kind).len()
    }

    /// Items of `kind` passing `filter`.
    #[must_use]
    pub fn list(&self, kind: EntityKind, filter: &EntityFilter) -> Vec<Item<'_>> {
        filter_items(self.items(kind), filter)
    }

    /// Look up one item by its ID.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if no item of `kind` has that ID.
    pub fn get_item(&self, kind: EntityKind, id: &str) -> Result<Item<'_>> {
        self.items(kind)
            .into_iter()
            .find(|item| item.id() == Some(id))
            .ok_or_else(|| GtmError::not_found(kind.as_str(), id))
    }

    /// Look up one item by its position in [`Self::items`].
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` past the end of the collection.
    pub fn get_item_at(&self, kind: EntityKind, index: usize) -> Result<Item<'_>> {
        let items = self.items(kind);
        let len = items.len();
        items
            .into_iter()
            .nth(index)
            .ok_or_else(|| GtmError::IndexOutOfRange {
                kind: kind.as_str().to_string(),
                index,
                len,
            })
    }

    /// Container header and counts.
    #[must_use]
    pub fn summary(&self) -> ContainerSummary {
        let cv = self.container_version();
        let meta = |field: &str| {
            cv.and_then(|cv| cv.meta_str(field))
                .filter(|v| !v.is_empty())
        };
        let unknown = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());

        let name = meta("name")
            .or_else(|| meta("containerName"))
            .or_else(|| {
                self.container
                    .extra
                    .get("containerName")
                    .and_then(value_as_string)
            })
            .or_else(|| {
                cv.and_then(|cv| cv.extra.get("container"))
                    .and_then(|c| c.get("name"))
                    .and_then(value_as_string)
            })
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNNAMED_CONTAINER.to_string());

        ContainerSummary {
            name,
            container_id: unknown(meta("containerId")),
            version_id: unknown(meta("containerVersionId")),
            account_id: unknown(meta("accountId")),
            export_format: unknown(
                self.container
                    .export_format_version
                    .as_ref()
                    .and_then(value_as_string),
            ),
            tags: self.count(EntityKind::Tag),
            triggers: self.count(EntityKind::Trigger),
            variables: self.count(EntityKind::Variable),
            folders: self.count(EntityKind::Folder),
        }
    }

    /// Display name of a folder, or "Unknown Folder".
    #[must_use]
    pub fn folder_name(&self, folder_id: &str) -> String {
        self.container_version()
            .and_then(|cv| {
                cv.folders()
                    .iter()
                    .find(|f| f.folder_id.as_deref() == Some(folder_id))
            })
            .and_then(|f| f.name.clone())
            .unwrap_or_else(|| UNKNOWN_FOLDER.to_string())
    }

    fn folder_exists(&self, folder_id: &str) -> bool {
        self.container_version()
            .is_some_and(|cv| cv.folders().iter().any(|f| f.id() == Some(folder_id)))
    }

    /// Container version `name`, `description` and `notes` as stored.
    #[must_use]
    pub fn settings(&self) -> ContainerSettings {
        let field = |name: &str| self.container_version().and_then(|cv| cv.meta_str(name));
        ContainerSettings {
            name: field("name"),
            description: field("description"),
            notes: field("notes"),
        }
    }

    /// Overwrite the container version settings present in `update`.
    ///
    /// Creates the container version when the document has none. Values
    /// are stored as given, empty strings included.
    ///
    /// # Errors
    ///
    /// Returns `NothingToDo` if `update` sets nothing.
    pub fn update_settings(&mut self, update: &ContainerSettings) -> Result<()> {
        if update.is_empty() {
            return Err(GtmError::NothingToDo {
                reason: "no settings to update".to_string(),
            });
        }
        let cv = self
            .container
            .container_version
            .get_or_insert_with(ContainerVersion::default);
        for (field, value) in ContainerSettings::FIELDS.into_iter().zip(update.values()) {
            if let Some(value) = value {
                cv.extra
                    .insert(field.to_string(), Value::String(value.to_string()));
            }
        }
        tracing::info!("updated container settings");
        self.dirty = true;
        Ok(())
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Update one item in place, addressed by ID or list position.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` or `IndexOutOfRange` if the item doesn't
    /// exist, or `Validation`
    /// for an empty name, an unknown folder or parameter key, a folder
    /// assignment on a folder, or `paused` on a non-tag.
    pub fn update_item(
        &mut self,
        kind: EntityKind,
        target: impl Into<ItemRef>,
        update: &ItemUpdate,
    ) -> Result<()> {
        let target = target.into();
        if update.is_empty() {
            return Err(GtmError::NothingToDo {
                reason: "no fields to update".to_string(),
            });
        }
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(GtmError::validation("name", "cannot be empty"));
            }
        }
        if let Some(Some(folder_id)) = &update.parent_folder_id {
            if !self.folder_exists(folder_id) {
                return Err(GtmError::validation(
                    "folder",
                    format!("no folder with ID {folder_id}"),
                ));
            }
        }
        if update.paused.is_some() && !kind.supports_paused() {
            return Err(GtmError::validation(
                "paused",
                format!("only tags can be paused, not {}", kind.plural()),
            ));
        }

        self.with_item_mut(kind, &target, |item| {
            if update.parent_folder_id.is_some() && item.parent_folder_mut().is_none() {
                return Err(GtmError::validation("folder", "folders cannot be nested"));
            }
            for (key, _) in &update.parameters {
                let known = item
                    .parameters_mut()
                    .is_some_and(|params| params.iter().any(|p| p.has_key(key)));
                if !known {
                    return Err(GtmError::validation(
                        "parameter",
                        format!("no parameter keyed {key}"),
                    ));
                }
            }

            if let (Some(folder), Some(slot)) = (&update.parent_folder_id, item.parent_folder_mut())
            {
                slot.clone_from(folder);
            }
            for (key, value) in &update.parameters {
                if let Some(param) = item
                    .parameters_mut()
                    .and_then(|params| params.iter_mut().find(|p| p.has_key(key)))
                {
                    param.value = Some(value.clone());
                }
            }
            if let Some(name) = &update.name {
                *item.name_mut() = Some(name.clone());
            }
            if let Some(notes) = &update.notes {
                *item.notes_mut() = Some(notes.clone());
            }
            if let (Some(paused), Some(slot)) = (update.paused, item.paused_mut()) {
                *slot = Some(paused);
            }
            Ok(())
        })?;

        tracing::info!(kind = %kind, target = %target, "updated item");
        self.dirty = true;
        Ok(())
    }

    /// Flip a tag's paused flag, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for non-tag kinds, or `ItemNotFound`.
    pub fn toggle_paused(&mut self, kind: EntityKind, target: impl Into<ItemRef>) -> Result<bool> {
        let target = target.into();
        if !kind.supports_paused() {
            return Err(GtmError::validation(
                "paused",
                format!("only tags can be paused, not {}", kind.plural()),
            ));
        }
        let paused = self.with_item_mut(kind, &target, |item| {
            let slot = item
                .paused_mut()
                .ok_or_else(|| GtmError::validation("paused", "not supported"))?;
            let next = !slot.unwrap_or(false);
            *slot = Some(next);
            Ok(next)
        })?;
        tracing::info!(target = %target, paused, "toggled tag status");
        self.dirty = true;
        Ok(paused)
    }

    /// Apply `edit` to every item of `kind` whose ID is in `ids`.
    ///
    /// IDs that match nothing are skipped. Returns how many items actually
    /// changed; items the edit leaves as they were are not counted.
    ///
    /// # Errors
    ///
    /// Returns `NothingToDo` for an empty edit or a toggle-only edit on a
    /// kind that cannot be paused, or `Validation` for an invalid regex, an
    /// unknown folder, or a folder assignment on folders.
    pub fn bulk_edit(&mut self, kind: EntityKind, ids: &[String], edit: &BulkEdit) -> Result<usize> {
        if edit.is_empty() {
            return Err(GtmError::NothingToDo {
                reason: "no bulk edit selected".to_string(),
            });
        }
        let renames = edit
            .find_replace
            .as_ref()
            .is_some_and(|(find, _)| !find.is_empty());
        let toggle_only = edit.toggle_paused && edit.folder.is_none() && !renames;
        if toggle_only && !kind.supports_paused() {
            return Err(GtmError::NothingToDo {
                reason: format!("{} cannot be enabled or disabled", kind.plural()),
            });
        }
        if edit.folder.is_some() && kind == EntityKind::Folder {
            return Err(GtmError::validation("folder", "folders cannot be nested"));
        }
        if let Some(Some(folder_id)) = &edit.folder {
            if !self.folder_exists(folder_id) {
                return Err(GtmError::validation(
                    "folder",
                    format!("no folder with ID {folder_id}"),
                ));
            }
        }
        let find_replace = match &edit.find_replace {
            Some((find, replace)) if !find.is_empty() => {
                let re = Regex::new(find)
                    .map_err(|e| GtmError::validation("find", e.to_string()))?;
                Some((re, replace.as_str()))
            }
            _ => None,
        };

        let mut edited = 0;
        for id in ids {
            let result = self.with_item_mut(kind, &ItemRef::Id(id.clone()), |item| {
                let mut changed = false;
                if edit.toggle_paused {
                    if let Some(slot) = item.paused_mut() {
                        *slot = Some(!slot.unwrap_or(false));
                        changed = true;
                    }
                }
                if let (Some(folder), Some(slot)) = (&edit.folder, item.parent_folder_mut()) {
                    if *slot != *folder {
                        slot.clone_from(folder);
                        changed = true;
                    }
                }
                if let Some((re, replace)) = &find_replace {
                    let name = item.name_mut();
                    if let Some(current) = name.take() {
                        let renamed = re.replace_all(&current, *replace).into_owned();
                        changed |= renamed != current;
                        *name = Some(renamed);
                    }
                }
                Ok(changed)
            });
            match result {
                Ok(true) => edited += 1,
                Ok(false) => {
                    tracing::debug!(kind = %kind, id = %id, "bulk edit left item unchanged");
                }
                Err(GtmError::ItemNotFound { .. }) => {
                    tracing::debug!(kind = %kind, id = %id, "bulk edit target missing");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(kind = %kind, edited, "bulk edit applied");
        if edited > 0 {
            self.dirty = true;
        }
        Ok(edited)
    }

    /// Remove every item of `kind` whose ID is in `ids`.
    ///
    /// For variables the ID is the normalized ID, and every raw copy under
    /// any source is removed. Returns how many raw items were removed.
    pub fn delete_items(&mut self, kind: EntityKind, ids: &[String]) -> usize {
        let Some(cv) = self.container.container_version.as_mut() else {
            return 0;
        };
        let wanted = |id: Option<&str>| id.is_some_and(|id| ids.iter().any(|w| w == id));

        let removed = match kind {
            EntityKind::Tag => retain_counted(cv.tags_mut(), |t| !wanted(t.id())),
            EntityKind::Trigger => retain_counted(cv.triggers_mut(), |t| !wanted(t.id())),
            EntityKind::Folder => retain_counted(cv.folders_mut(), |f| !wanted(f.id())),
            EntityKind::Variable => VariableSource::ALL
                .into_iter()
                .map(|source| {
                    retain_counted(cv.variables_in_mut(source), |v| {
                        !wanted(unified_id(v, source))
                    })
                })
                .sum(),
        };

        tracing::info!(kind = %kind, removed, "deleted items");
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Proposed changes for `row`. Does not mutate the store.
    #[must_use]
    pub fn build_changes(&self, row: &SheetRow) -> Vec<Change> {
        build_changes(self.container_version(), row)
    }

    /// Apply a change set built from this store.
    pub fn apply_changes(&mut self, changes: Vec<Change>) -> ApplyReport {
        let Some(cv) = self.container.container_version.as_mut() else {
            return ApplyReport::default();
        };
        let report = apply_changes(cv, changes);
        if report.applied() > 0 {
            self.dirty = true;
        }
        report
    }

    // ========================================================================
    // Dirty Tracking
    // ========================================================================

    /// Whether anything was modified since load.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn with_item_mut<R>(
        &mut self,
        kind: EntityKind,
        target: &ItemRef,
        f: impl FnOnce(&mut dyn Editable) -> Result<R>,
    ) -> Result<R> {
        let len = self.count(kind);
        let not_found = || match target {
            ItemRef::Id(id) => GtmError::not_found(kind.as_str(), id.as_str()),
            ItemRef::Index(index) => GtmError::IndexOutOfRange {
                kind: kind.as_str().to_string(),
                index: *index,
                len,
            },
        };

        let variable_key = match kind {
            EntityKind::Variable => Some(
                self.variables()
                    .into_iter()
                    .enumerate()
                    .find(|(i, v)| target.matches(*i, v.variable_id()))
                    .ok_or_else(not_found)?
                    .1
                    .key,
            ),
            _ => None,
        };

        let cv = self
            .container
            .container_version
            .as_mut()
            .ok_or_else(not_found)?;

        let item: &mut dyn Editable = match (kind, variable_key) {
            (EntityKind::Variable, Some(key)) => variable_at_mut(cv, key).ok_or_else(not_found)?,
            (EntityKind::Tag, _) => find_mut(cv.tags_mut(), target).ok_or_else(not_found)?,
            (EntityKind::Trigger, _) => find_mut(cv.triggers_mut(), target).ok_or_else(not_found)?,
            (EntityKind::Folder, _) => find_mut(cv.folders_mut(), target).ok_or_else(not_found)?,
            (EntityKind::Variable, None) => return Err(not_found()),
        };
        f(item)
    }
}

fn find_mut<'a, T: Entity>(items: Option<&'a mut Vec<T>>, target: &ItemRef) -> Option<&'a mut T> {
    items?
        .iter_mut()
        .enumerate()
        .find(|(i, item)| target.matches(*i, item.id()))
        .map(|(_, item)| item)
}

fn retain_counted<T>(items: Option<&mut Vec<T>>, keep: impl FnMut(&T) -> bool) -> usize {
    let Some(items) = items else {
        return 0;
    };
    let before = items.len();
    items.retain(keep);
    before - items.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StatusFilter;

    const SAMPLE: &str = r#"{
        "exportFormatVersion": 2,
        "exportTime": "2024-05-01 10:00:00",
        "containerVersion": {
            "accountId": "111",
            "containerId": "222",
            "containerVersionId": "3",
            "container": {"name": "Acme Site"},
            "tag": [
                {"tagId": "10", "name": "GA4 Config", "type": "gaawc", "parentFolderId": "1",
                 "parameter": [{"type": "template", "key": "measurementId", "value": "{{GA4 ID}}"}]},
                {"tagId": "11", "name": "CallRail", "type": "html", "paused": true,
                 "parameter": [{"type": "template", "key": "html", "value": "<script src='//cdn.callrail.com/a.js'></script>"}]}
            ],
            "trigger": [{"triggerId": "20", "name": "All Pages", "type": "pageview"}],
            "folder": [{"folderId": "1", "name": "Analytics"}, {"folderId": "2", "name": "Ads"}],
            "variable": [
                {"variableId": "30", "name": "GA4 ID", "type": "c",
                 "parameter": [{"type": "template", "key": "value", "value": "G-OLD"}]}
            ],
            "builtInVariable": [{"name": "Page URL", "type": "PAGE_URL"}],
            "enabledBuiltInVariable": [{"builtInVariableId": "30", "name": "Shadowed", "type": "X"}]
        }
    }"#;

    fn store() -> ContainerStore {
        ContainerStore::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn test_items_and_counts() {
        let store = store();
        assert_eq!(store.count(EntityKind::Tag), 2);
        assert_eq!(store.count(EntityKind::Trigger), 1);
        assert_eq!(store.count(EntityKind::Variable), 2);
        assert_eq!(store.count(EntityKind::Folder), 2);
        assert!(ContainerStore::new().items(EntityKind::Variable).is_empty());
    }

    #[test]
    fn test_summary_name_chain_and_defaults() {
        let summary = store().summary();
        assert_eq!(summary.name, "Acme Site");
        assert_eq!(summary.container_id, "222");
        assert_eq!(summary.export_format, "2");
        assert_eq!(summary.variables, 2);

        let empty = ContainerStore::new().summary();
        assert_eq!(empty.name, "Unnamed Container");
        assert_eq!(empty.account_id, "Unknown");
    }

    #[test]
    fn test_folder_name() {
        let store = store();
        assert_eq!(store.folder_name("2"), "Ads");
        assert_eq!(store.folder_name("99"), "Unknown Folder");
    }

    #[test]
    fn test_list_with_filter() {
        let store = store();
        let disabled = store.list(EntityKind::Tag, &EntityFilter::new("", StatusFilter::Disabled));
        assert_eq!(disabled.len(), 1);
        assert_eq!(disabled[0].name(), Some("CallRail"));
        let by_type = store.list(EntityKind::Tag, &EntityFilter::new("GAAWC", StatusFilter::Any));
        assert_eq!(by_type[0].id(), Some("10"));
    }

    #[test]
    fn test_get_item() {
        let store = store();
        assert_eq!(store.get_item(EntityKind::Variable, "30").unwrap().name(), Some("GA4 ID"));
        assert!(matches!(
            store.get_item(EntityKind::Tag, "nope"),
            Err(GtmError::ItemNotFound { .. })
        ));
        assert!(matches!(
            store.get_item_at(EntityKind::Trigger, 5),
            Err(GtmError::IndexOutOfRange { len: 1, .. })
        ));
    }

    #[test]
    fn test_update_item() {
        let mut store = store();
        let update = ItemUpdate {
            name: Some("GA4 Measurement".to_string()),
            parent_folder_id: Some(None),
            parameters: vec![("measurementId".to_string(), "G-NEW".to_string())],
            ..Default::default()
        };
        store.update_item(EntityKind::Tag, "10", &update).unwrap();
        let tag = store.get_item(EntityKind::Tag, "10").unwrap();
        assert_eq!(tag.name(), Some("GA4 Measurement"));
        assert_eq!(tag.parent_folder_id(), None);
        assert_eq!(tag.parameters()[0].value.as_deref(), Some("G-NEW"));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_update_item_validation() {
        let mut store = store();
        let blank = ItemUpdate {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_item(EntityKind::Tag, "10", &blank),
            Err(GtmError::Validation { .. })
        ));
        let paused = ItemUpdate {
            paused: Some(true),
            ..Default::default()
        };
        assert!(matches!(
            store.update_item(EntityKind::Trigger, "20", &paused),
            Err(GtmError::Validation { .. })
        ));
        let bad_param = ItemUpdate {
            parameters: vec![("missing".to_string(), "x".to_string())],
            ..Default::default()
        };
        assert!(matches!(
            store.update_item(EntityKind::Variable, "30", &bad_param),
            Err(GtmError::Validation { .. })
        ));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_toggle_paused() {
        let mut store = store();
        assert!(!store.toggle_paused(EntityKind::Tag, "11").unwrap());
        assert!(store.toggle_paused(EntityKind::Tag, "10").unwrap());
        assert!(matches!(
            store.toggle_paused(EntityKind::Variable, "30"),
            Err(GtmError::Validation { .. })
        ));
    }

    #[test]
    fn test_bulk_edit_find_replace_is_global() {
        let mut store = store();
        let edit = BulkEdit {
            find_replace: Some(("l+".to_string(), "L".to_string())),
            ..Default::default()
        };
        let ids = vec!["10".to_string(), "11".to_string(), "missing".to_string()];
        assert_eq!(store.bulk_edit(EntityKind::Tag, &ids, &edit).unwrap(), 2);
        assert_eq!(store.get_item(EntityKind::Tag, "11").unwrap().name(), Some("CaLRaiL"));
    }

    #[test]
    fn test_bulk_edit_rejects_bad_regex() {
        let mut store = store();
        let edit = BulkEdit {
            find_replace: Some(("(".to_string(), String::new())),
            ..Default::default()
        };
        assert!(matches!(
            store.bulk_edit(EntityKind::Tag, &["10".to_string()], &edit),
            Err(GtmError::Validation { .. })
        ));
    }

    #[test]
    fn test_bulk_edit_folder_and_toggle() {
        let mut store = store();
        let edit = BulkEdit {
            toggle_paused: true,
            folder: Some(Some("2".to_string())),
            ..Default::default()
        };
        let ids = vec!["10".to_string(), "11".to_string()];
        store.bulk_edit(EntityKind::Tag, &ids, &edit).unwrap();
        let items = store.items(EntityKind::Tag);
        assert!(items.iter().all(|t| t.parent_folder_id() == Some("2")));
        assert!(items[0].paused());
        assert!(!items[1].paused());
    }

    #[test]
    fn test_bulk_edit_counts_only_changed_items() {
        let mut store = store();
        let edit = BulkEdit {
            folder: Some(Some("1".to_string())),
            ..Default::default()
        };
        let ids = vec!["10".to_string(), "11".to_string()];
        // Tag 10 already sits in folder 1.
        assert_eq!(store.bulk_edit(EntityKind::Tag, &ids, &edit).unwrap(), 1);

        let mut store = self::store();
        let edit = BulkEdit {
            find_replace: Some(("zzz".to_string(), "y".to_string())),
            ..Default::default()
        };
        assert_eq!(store.bulk_edit(EntityKind::Tag, &ids, &edit).unwrap(), 0);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_bulk_toggle_on_triggers_is_nothing_to_do() {
        let mut store = store();
        let edit = BulkEdit {
            toggle_paused: true,
            ..Default::default()
        };
        assert!(matches!(
            store.bulk_edit(EntityKind::Trigger, &["20".to_string()], &edit),
            Err(GtmError::NothingToDo { .. })
        ));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_update_item_by_index_reaches_builtin_variables() {
        let mut store = store();
        let index = store
            .items(EntityKind::Variable)
            .iter()
            .position(|v| v.name() == Some("Page URL"))
            .unwrap();
        assert_eq!(store.get_item_at(EntityKind::Variable, index).unwrap().id(), None);

        let update = ItemUpdate {
            name: Some("Landing URL".to_string()),
            ..Default::default()
        };
        store
            .update_item(EntityKind::Variable, index, &update)
            .unwrap();
        let renamed = store.get_item_at(EntityKind::Variable, index).unwrap();
        assert_eq!(renamed.name(), Some("Landing URL"));
        assert!(store.is_dirty());

        assert!(matches!(
            store.update_item(EntityKind::Variable, 9, &update),
            Err(GtmError::IndexOutOfRange { index: 9, len: 2, .. })
        ));
    }

    #[test]
    fn test_toggle_paused_by_index() {
        let mut store = store();
        assert!(!store.toggle_paused(EntityKind::Tag, 1).unwrap());
        assert!(!store.get_item(EntityKind::Tag, "11").unwrap().paused());
    }

    #[test]
    fn test_settings_read_and_update() {
        let mut store = store();
        assert_eq!(store.settings(), ContainerSettings::default());
        assert!(matches!(
            store.update_settings(&ContainerSettings::default()),
            Err(GtmError::NothingToDo { .. })
        ));

        let update = ContainerSettings {
            name: Some("Acme v4".to_string()),
            notes: Some("Removed CallRail".to_string()),
            ..Default::default()
        };
        store.update_settings(&update).unwrap();
        let settings = store.settings();
        assert_eq!(settings.name.as_deref(), Some("Acme v4"));
        assert_eq!(settings.description, None);
        assert_eq!(settings.notes.as_deref(), Some("Removed CallRail"));
        assert!(store.is_dirty());
        assert_eq!(store.count(EntityKind::Tag), 2);
    }

    #[test]
    fn test_update_settings_creates_container_version() {
        let mut store = ContainerStore::new();
        let update = ContainerSettings {
            description: Some("Staging".to_string()),
            ..Default::default()
        };
        store.update_settings(&update).unwrap();
        assert_eq!(store.settings().description.as_deref(), Some("Staging"));
    }

    #[test]
    fn test_delete_variable_removes_every_raw_copy() {
        let mut store = store();
        let removed = store.delete_items(EntityKind::Variable, &["30".to_string()]);
        assert_eq!(removed, 2);
        assert_eq!(store.count(EntityKind::Variable), 1);
        assert!(
            store
                .container_version()
                .unwrap()
                .variables_in(VariableSource::BuiltInEnabled)
                .is_empty()
        );
    }

    #[test]
    fn test_delete_tags() {
        let mut store = store();
        assert_eq!(store.delete_items(EntityKind::Tag, &["11".to_string()]), 1);
        assert_eq!(store.delete_items(EntityKind::Tag, &["11".to_string()]), 0);
        assert_eq!(store.count(EntityKind::Tag), 1);
    }

    #[test]
    fn test_sync_roundtrip_through_store() {
        let mut store = store();
        let headers = vec!["GA4 Measurement ID".to_string(), "CallRail Tag".to_string()];
        let cells = vec!["G-NEW".to_string(), "<script>new</script>".to_string()];
        let row = SheetRow::from_parts(&headers, &cells);

        let changes = store.build_changes(&row);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].old_value, "G-OLD");
        assert!(!store.is_dirty());

        let report = store.apply_changes(changes);
        assert_eq!(report.applied(), 2);
        let var = store.get_item(EntityKind::Variable, "30").unwrap();
        assert_eq!(var.parameters()[0].value.as_deref(), Some("G-NEW"));
        let tag = store.get_item(EntityKind::Tag, "11").unwrap();
        assert_eq!(tag.parameters()[0].value.as_deref(), Some("<script>new</script>"));
    }

    #[test]
    fn test_roundtrip_save_load_preserves_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("container.json");

        let store = store();
        store.save_to(&path).unwrap();

        let loaded = ContainerStore::open(&path).unwrap();
        for kind in EntityKind::ALL {
            assert_eq!(loaded.count(kind), store.count(kind));
        }
        assert_eq!(loaded.container(), store.container());
        assert!(ContainerStore::new().save().is_err());
    }
}
