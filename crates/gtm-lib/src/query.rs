//! Search and filter types for entity listings.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::GtmError;
use crate::model::Entity;

/// Enabled/disabled filter. Only tags can be paused, so `Disabled`
/// on any other kind filters everything out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    Any,
    Enabled,
    Disabled,
}

impl StatusFilter {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }

    #[must_use]
    pub const fn matches(&self, paused: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Enabled => !paused,
            Self::Disabled => paused,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = GtmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "any" => Ok(Self::Any),
            "enabled" | "active" => Ok(Self::Enabled),
            "disabled" | "paused" => Ok(Self::Disabled),
            other => Err(GtmError::InvalidStatusFilter {
                status: other.to_string(),
            }),
        }
    }
}

/// Filter options for listing entities.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    /// Case-insensitive substring matched against name and type.
    pub query: String,
    pub status: StatusFilter,
}

impl EntityFilter {
    #[must_use]
    pub fn new(query: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            query: query.into(),
            status,
        }
    }

    #[must_use]
    pub fn matches<E: Entity>(&self, item: &E) -> bool {
        let query = self.query.to_lowercase();
        let matches_search = query.is_empty()
            || item
                .name()
                .is_some_and(|n| n.to_lowercase().contains(&query))
            || item
                .entity_type()
                .is_some_and(|t| t.to_lowercase().contains(&query));

        matches_search && self.status.matches(item.paused())
    }
}

/// Fields to change on a single entity. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    /// `Some(None)` removes the folder assignment.
    pub parent_folder_id: Option<Option<String>>,
    pub notes: Option<String>,
    /// `(key, value)` pairs; each key must already exist on the entity.
    pub parameters: Vec<(String, String)>,
    /// Tags only.
    pub paused: Option<bool>,
}

impl ItemUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.parent_folder_id.is_none()
            && self.notes.is_none()
            && self.parameters.is_empty()
            && self.paused.is_none()
    }
}

/// How a single-item edit addresses its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Id(String),
    /// Zero-based position in `ContainerStore::items(kind)`; reaches
    /// entities that carry no ID.
    Index(usize),
}

impl ItemRef {
    /// Whether the entity at `index` with identity `id` is the target.
    #[must_use]
    pub fn matches(&self, index: usize, id: Option<&str>) -> bool {
        match self {
            Self::Id(want) => id == Some(want.as_str()),
            Self::Index(at) => *at == index,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Index(index) => write!(f, "#{index}"),
        }
    }
}

impl From<&str> for ItemRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for ItemRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<usize> for ItemRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Container version `name`, `description` and `notes`.
///
/// As an update, `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerSettings {
    pub name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl ContainerSettings {
    pub const FIELDS: [&'static str; 3] = ["name", "description", "notes"];

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.notes.is_none()
    }

    /// Fields in `FIELDS` order.
    #[must_use]
    pub fn values(&self) -> [Option<&str>; 3] {
        [
            self.name.as_deref(),
            self.description.as_deref(),
            self.notes.as_deref(),
        ]
    }
}

/// Edits applied to every selected entity.
#[derive(Debug, Clone, Default)]
pub struct BulkEdit {
    /// Flip `paused`. Tags only; other kinds are left unchanged.
    pub toggle_paused: bool,
    /// `Some(None)` removes the folder assignment.
    pub folder: Option<Option<String>>,
    /// Regex pattern and replacement applied globally to names.
    pub find_replace: Option<(String, String)>,
}

impl BulkEdit {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.toggle_paused
            && self.folder.is_none()
            && self
                .find_replace
                .as_ref()
                .is_none_or(|(find, _)| find.is_empty())
    }
}

/// Narrow `items` to those passing `filter`, keeping input order.
pub fn filter_items<I, E>(items: I, filter: &EntityFilter) -> Vec<E>
where
    I: IntoIterator<Item = E>,
    E: Entity,
{
    let filtered: Vec<E> = items
        .into_iter()
        .filter(|item| filter.matches(item))
        .collect();
    tracing::trace!(
        query = %filter.query,
        status = %filter.status,
        kept = filtered.len(),
        "filtered items"
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Tag, Trigger};

    fn tag(name: &str, tag_type: &str, paused: bool) -> Tag {
        Tag {
            name: Some(name.to_string()),
            tag_type: Some(tag_type.to_string()),
            paused: paused.then_some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_yields_empty() {
        let items: Vec<Tag> = Vec::new();
        let filter = EntityFilter::new("x", StatusFilter::Any);
        assert!(filter_items(&items, &filter).is_empty());
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let items = vec![tag("B", "html", false), tag("A", "gaawe", true)];
        let kept = filter_items(&items, &EntityFilter::default());
        let names: Vec<_> = kept.iter().filter_map(|t| t.name.as_deref()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_query_matches_name_or_type_case_insensitively() {
        let items = vec![
            tag("CallRail", "html", false),
            tag("GA4 Config", "gaawc", false),
            tag("Other", "img", false),
        ];
        let by_name = filter_items(&items, &EntityFilter::new("callRAIL", StatusFilter::Any));
        assert_eq!(by_name.len(), 1);
        let by_type = filter_items(&items, &EntityFilter::new("GAAW", StatusFilter::Any));
        assert_eq!(by_type[0].name.as_deref(), Some("GA4 Config"));
    }

    #[test]
    fn test_status_filter_on_tags() {
        let items = vec![tag("on", "html", false), tag("off", "html", true)];
        let enabled = filter_items(&items, &EntityFilter::new("", StatusFilter::Enabled));
        assert_eq!(enabled[0].name.as_deref(), Some("on"));
        let disabled = filter_items(&items, &EntityFilter::new("", StatusFilter::Disabled));
        assert_eq!(disabled.len(), 1);
        assert_eq!(disabled[0].name.as_deref(), Some("off"));
    }

    #[test]
    fn test_disabled_filter_on_triggers_is_empty() {
        let items = vec![Trigger {
            name: Some("All Pages".to_string()),
            ..Default::default()
        }];
        assert!(filter_items(&items, &EntityFilter::new("", StatusFilter::Disabled)).is_empty());
        assert_eq!(
            filter_items(&items, &EntityFilter::new("", StatusFilter::Enabled)).len(),
            1
        );
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::Any);
        assert_eq!("Enabled".parse::<StatusFilter>().unwrap(), StatusFilter::Enabled);
        assert_eq!("disabled".parse::<StatusFilter>().unwrap(), StatusFilter::Disabled);
        assert!("sometimes".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_item_ref_matching() {
        assert!(ItemRef::from("7").matches(0, Some("7")));
        assert!(!ItemRef::from("7").matches(0, None));
        assert!(ItemRef::from(2).matches(2, None));
        assert!(!ItemRef::Index(2).matches(1, Some("2")));
        assert_eq!(ItemRef::Index(3).to_string(), "#3");
    }
}
