//! Proposed changes derived from one spreadsheet row.
//!
//! [`build_changes`] walks a fixed table of variable mappings followed by
//! the CallRail tag, emitting a [`Change`] whenever both the target entity
//! and a non-empty sheet cell exist. Missing sides are skipped silently.

use serde::Serialize;

use crate::apply::{read_variable_value, tag_html_param};
use crate::matcher::{MatchMode, find_match};
use crate::model::{ContainerVersion, Tag};
use crate::normalize::{VariableKey, normalize_variables};
use crate::sheet::SheetRow;

/// Sheet column carrying the CallRail snippet.
pub const CALLRAIL_COLUMN: &str = "CallRail Tag";

const CALLRAIL_MARKERS: [&str; 2] = ["callrail", "cdn.callrail.com"];

/// What a change writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ChangeTarget {
    Variable(VariableKey),
    Tag { index: usize },
}

/// One proposed edit. Consumed by [`crate::apply::apply_changes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub target: ChangeTarget,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub description: String,
}

impl Change {
    /// Whether applying this change would alter anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.old_value == self.new_value
    }
}

/// A variable slot reconciled from a sheet column.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    /// Description prefix, e.g. `GA4 Measurement ID Variable`.
    pub label: &'static str,
    pub column: &'static str,
    pub keywords: &'static [&'static str],
    pub mode: MatchMode,
}

const GA4: &str = "GA4 Measurement ID Variable";
const CONVERSION_ID: &str = "Conversion ID Variable";
const GADS_LABEL: &str = "GAds Label Variable";
const TTD_LABEL: &str = "TTD Label Variable";

const fn strict(
    label: &'static str,
    column: &'static str,
    keywords: &'static [&'static str],
) -> FieldMapping {
    FieldMapping {
        label,
        column,
        keywords,
        mode: MatchMode::Strict,
    }
}

/// Variable mappings in evaluation order.
pub const VARIABLE_MAPPINGS: [FieldMapping; 16] = [
    FieldMapping {
        label: GA4,
        column: "GA4 Measurement ID",
        keywords: &["ga4", "measurement", "tracking", "google analytics"],
        mode: MatchMode::Loose,
    },
    FieldMapping {
        label: CONVERSION_ID,
        column: "Conversion ID",
        keywords: &["conversion", "conv", "ads", "google ads", "account"],
        mode: MatchMode::Loose,
    },
    strict(
        GADS_LABEL,
        "Gads Conversion Label\nApply Now Start",
        &["gads", "conversion", "label", "apply", "start"],
    ),
    strict(
        GADS_LABEL,
        "Gads Conversion Label\nApply Now End",
        &["gads", "conversion", "label", "apply", "end"],
    ),
    strict(
        GADS_LABEL,
        "Gads Conversion Label\nContact Submit Start",
        &["gads", "conversion", "label", "contact", "start"],
    ),
    strict(
        GADS_LABEL,
        "Gads Conversion Label\nContact Submit End",
        &["gads", "conversion", "label", "contact", "end"],
    ),
    strict(
        GADS_LABEL,
        "Gads Conversion Label\nSchedule Tour Start",
        &["gads", "conversion", "label", "tour", "start"],
    ),
    strict(
        GADS_LABEL,
        "Gads Conversion Label\nSchedule Tour End",
        &["gads", "conversion", "label", "tour", "end"],
    ),
    strict(
        GADS_LABEL,
        "Gads Conversion Label\nVirtual Tour",
        &["gads", "conversion", "label", "virtual", "tour"],
    ),
    strict(TTD_LABEL, "TTD - Apply Start CT", &["ttd", "ct", "apply", "start"]),
    strict(TTD_LABEL, "TTD - Apply End CT", &["ttd", "ct", "apply", "end"]),
    strict(TTD_LABEL, "TTD - Contact Start CT", &["ttd", "ct", "contact", "start"]),
    strict(TTD_LABEL, "TTD - Contact End CT", &["ttd", "ct", "contact", "end"]),
    strict(
        TTD_LABEL,
        "TTD - Schedule a Tour Start CT",
        &["ttd", "ct", "schedule", "tour", "start"],
    ),
    strict(
        TTD_LABEL,
        "TTD - Schedule a Tour End CT",
        &["ttd", "ct", "schedule", "tour", "end"],
    ),
    strict(TTD_LABEL, "TTD - Virtual Tour CT", &["ttd", "ct", "virtual", "tour"]),
];

/// Index of the first `html` tag whose HTML mentions CallRail.
#[must_use]
pub fn find_callrail_tag(tags: &[Tag]) -> Option<usize> {
    tags.iter().position(|tag| {
        tag.tag_type.as_deref() == Some("html")
            && tag_html_param(tag)
                .and_then(|p| p.value.as_deref())
                .is_some_and(|html| {
                    let html = html.to_lowercase();
                    CALLRAIL_MARKERS.iter().any(|m| html.contains(m))
                })
    })
}

fn cell<'r>(row: &'r SheetRow, column: &str) -> Option<&'r str> {
    row.get(column).filter(|v| !v.is_empty())
}

/// Build the ordered change set for `row`. Does not mutate anything.
#[must_use]
pub fn build_changes(version: Option<&ContainerVersion>, row: &SheetRow) -> Vec<Change> {
    let variables = normalize_variables(version);
    let mut changes = Vec::new();

    for mapping in &VARIABLE_MAPPINGS {
        let Some(variable) = find_match(variables.iter(), mapping.keywords, mapping.mode) else {
            continue;
        };
        let Some(new_value) = cell(row, mapping.column) else {
            tracing::debug!(column = mapping.column, "sheet cell empty");
            continue;
        };
        let name = variable.variable.name.as_deref().unwrap_or_default();
        changes.push(Change {
            target: ChangeTarget::Variable(variable.key),
            field: "defaultValue".to_string(),
            old_value: read_variable_value(variable.variable),
            new_value: new_value.to_string(),
            description: format!("{}: {name}", mapping.label),
        });
    }

    let tags = version.map(ContainerVersion::tags).unwrap_or_default();
    if let (Some(index), Some(new_value)) = (find_callrail_tag(tags), cell(row, CALLRAIL_COLUMN)) {
        let tag = &tags[index];
        let old_value = tag_html_param(tag)
            .and_then(|p| p.value.clone())
            .unwrap_or_default();
        changes.push(Change {
            target: ChangeTarget::Tag { index },
            field: "html".to_string(),
            old_value,
            new_value: new_value.to_string(),
            description: format!(
                "CallRail HTML Tag: {}",
                tag.name.as_deref().unwrap_or_default()
            ),
        });
    }

    tracing::info!(count = changes.len(), "built change set");
    changes
}
