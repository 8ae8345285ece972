//! Core data types for gtm-lib.
//!
//! Mirrors the GTM container export format. Every entity keeps the fields
//! it does not model in a flattened `extra` map so a load/save round trip
//! never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::GtmError;

/// Kind of container entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Tag,
    Trigger,
    Variable,
    Folder,
}

impl EntityKind {
    pub const ALL: [Self; 4] = [Self::Tag, Self::Trigger, Self::Variable, Self::Folder];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Trigger => "trigger",
            Self::Variable => "variable",
            Self::Folder => "folder",
        }
    }

    #[must_use]
    pub const fn plural(&self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Trigger => "triggers",
            Self::Variable => "variables",
            Self::Folder => "folders",
        }
    }

    /// JSON field carrying the entity's identity.
    ///
    /// Variables from built-in sources may carry `builtInVariableId`
    /// instead; the normalizer resolves that.
    #[must_use]
    pub const fn id_field(&self) -> &'static str {
        match self {
            Self::Tag => "tagId",
            Self::Trigger => "triggerId",
            Self::Variable => "variableId",
            Self::Folder => "folderId",
        }
    }

    /// Only tags carry a `paused` flag.
    #[must_use]
    pub const fn supports_paused(&self) -> bool {
        matches!(self, Self::Tag)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = GtmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tag" | "tags" => Ok(Self::Tag),
            "trigger" | "triggers" => Ok(Self::Trigger),
            "variable" | "variables" | "var" | "vars" => Ok(Self::Variable),
            "folder" | "folders" => Ok(Self::Folder),
            other => Err(GtmError::InvalidKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// One of the six sequences a container version may spread variables over.
///
/// Declaration order is the concatenation order used by the normalizer,
/// which decides which duplicate survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariableSource {
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "built-in")]
    BuiltIn,
    #[serde(rename = "custom-alt")]
    CustomAlt,
    #[serde(rename = "built-in-enabled")]
    BuiltInEnabled,
    #[serde(rename = "built-in-disabled")]
    BuiltInDisabled,
    #[serde(rename = "built-in-workspace")]
    BuiltInWorkspace,
}

impl VariableSource {
    pub const ALL: [Self; 6] = [
        Self::Custom,
        Self::BuiltIn,
        Self::CustomAlt,
        Self::BuiltInEnabled,
        Self::BuiltInDisabled,
        Self::BuiltInWorkspace,
    ];

    /// The `variableType` label attached to normalized variables.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::BuiltIn => "built-in",
            Self::CustomAlt => "custom-alt",
            Self::BuiltInEnabled => "built-in-enabled",
            Self::BuiltInDisabled => "built-in-disabled",
            Self::BuiltInWorkspace => "built-in-workspace",
        }
    }

    /// Name of the container version field holding this sequence.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::Custom => "variable",
            Self::BuiltIn => "builtInVariable",
            Self::CustomAlt => "customVariable",
            Self::BuiltInEnabled => "enabledBuiltInVariable",
            Self::BuiltInDisabled => "disabledBuiltInVariable",
            Self::BuiltInWorkspace => "workspaceBuiltInVariable",
        }
    }

    #[must_use]
    pub const fn is_built_in(&self) -> bool {
        !matches!(self, Self::Custom | Self::CustomAlt)
    }
}

impl fmt::Display for VariableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Root of an exported container file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_format_version: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_version: Option<ContainerVersion>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One snapshot of a container's entities.
///
/// All sequences are optional; an absent sequence reads as empty and stays
/// absent on write unless something was added to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Vec<Tag>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Vec<Trigger>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<Vec<Folder>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<Vec<Variable>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_in_variable: Option<Vec<Variable>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_variable: Option<Vec<Variable>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_built_in_variable: Option<Vec<Variable>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_built_in_variable: Option<Vec<Variable>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_built_in_variable: Option<Vec<Variable>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContainerVersion {
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        self.tag.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        self.trigger.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn folders(&self) -> &[Folder] {
        self.folder.as_deref().unwrap_or_default()
    }

    /// Raw variables of a single source sequence.
    ///
    /// Callers outside the normalizer should go through
    /// [`crate::normalize::normalize_variables`] instead.
    #[must_use]
    pub fn variables_in(&self, source: VariableSource) -> &[Variable] {
        let seq = match source {
            VariableSource::Custom => &self.variable,
            VariableSource::BuiltIn => &self.built_in_variable,
            VariableSource::CustomAlt => &self.custom_variable,
            VariableSource::BuiltInEnabled => &self.enabled_built_in_variable,
            VariableSource::BuiltInDisabled => &self.disabled_built_in_variable,
            VariableSource::BuiltInWorkspace => &self.workspace_built_in_variable,
        };
        seq.as_deref().unwrap_or_default()
    }

    /// Mutable raw sequence of a source, if present in the document.
    pub fn variables_in_mut(&mut self, source: VariableSource) -> Option<&mut Vec<Variable>> {
        let seq = match source {
            VariableSource::Custom => &mut self.variable,
            VariableSource::BuiltIn => &mut self.built_in_variable,
            VariableSource::CustomAlt => &mut self.custom_variable,
            VariableSource::BuiltInEnabled => &mut self.enabled_built_in_variable,
            VariableSource::BuiltInDisabled => &mut self.disabled_built_in_variable,
            VariableSource::BuiltInWorkspace => &mut self.workspace_built_in_variable,
        };
        seq.as_mut()
    }

    pub fn tags_mut(&mut self) -> Option<&mut Vec<Tag>> {
        self.tag.as_mut()
    }

    pub fn triggers_mut(&mut self) -> Option<&mut Vec<Trigger>> {
        self.trigger.as_mut()
    }

    pub fn folders_mut(&mut self) -> Option<&mut Vec<Folder>> {
        self.folder.as_mut()
    }

    /// Read a string-ish metadata field (`accountId`, `name`, ...).
    #[must_use]
    pub fn meta_str(&self, field: &str) -> Option<String> {
        value_as_string(self.extra.get(field)?)
    }
}

/// A `{key, type, value}` configuration triple.
///
/// `list` and `map` parameters nest further parameters; those live in
/// `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Parameter {
    #[must_use]
    pub fn template(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            param_type: Some("template".to_string()),
            value: Some(value.into()),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

/// A unit of code fired by triggers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Vec<Parameter>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tag {
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.unwrap_or(false)
    }
}

/// A condition that fires tags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Vec<Parameter>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named value, user-defined or provided by GTM.
///
/// A top-level `defaultValue`, when a document carries one, stays in
/// `extra` so its presence (even as `null`) is observable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_in_variable_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Vec<Parameter>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Organizational grouping referenced by `parentFolderId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Uniform read access used by filtering and pattern matching.
pub trait Entity {
    fn name(&self) -> Option<&str>;

    /// GTM's own `type` field (e.g. `html`, `gaawe`, `c`).
    fn entity_type(&self) -> Option<&str>;

    /// Identity value under the kind's ID field.
    fn id(&self) -> Option<&str>;

    fn paused(&self) -> bool {
        false
    }
}

impl<T: Entity + ?Sized> Entity for &T {
    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn entity_type(&self) -> Option<&str> {
        (**self).entity_type()
    }

    fn id(&self) -> Option<&str> {
        (**self).id()
    }

    fn paused(&self) -> bool {
        (**self).paused()
    }
}

impl Entity for Tag {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn entity_type(&self) -> Option<&str> {
        self.tag_type.as_deref()
    }

    fn id(&self) -> Option<&str> {
        self.tag_id.as_deref()
    }

    fn paused(&self) -> bool {
        self.is_paused()
    }
}

impl Entity for Trigger {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn entity_type(&self) -> Option<&str> {
        self.trigger_type.as_deref()
    }

    fn id(&self) -> Option<&str> {
        self.trigger_id.as_deref()
    }
}

impl Entity for Variable {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn entity_type(&self) -> Option<&str> {
        self.variable_type.as_deref()
    }

    fn id(&self) -> Option<&str> {
        non_empty(self.variable_id.as_deref())
            .or_else(|| non_empty(self.built_in_variable_id.as_deref()))
    }
}

impl Entity for Folder {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn entity_type(&self) -> Option<&str> {
        None
    }

    fn id(&self) -> Option<&str> {
        self.folder_id.as_deref()
    }
}

/// Treat empty identity strings as absent.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Render a scalar JSON value as a string; `null`, arrays and objects yield `None`.
#[must_use]
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
