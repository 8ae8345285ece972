//! Text formatting functions for `gtmx`.
//!
//! Plain (non-ANSI) lines for terminal output:
//! - Status badges (● enabled, ○ paused)
//! - Entity lines `{badge} {id} [{type}] {name}`
//! - Change previews and the container summary

use std::fmt::Write as _;

use gtm_lib::{Change, ContainerSummary, Entity, Item};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Badge characters.
pub mod icons {
    /// Enabled tag, or any non-tag entity.
    pub const ENABLED: &str = "●";
    /// Paused tag.
    pub const PAUSED: &str = "○";
}

const VALUE_WIDTH: usize = 60;

/// Badge for an entity's paused state.
#[must_use]
pub const fn format_status_badge(paused: bool) -> &'static str {
    if paused { icons::PAUSED } else { icons::ENABLED }
}

/// Cut `text` to at most `width` display columns, marking the cut with `…`.
#[must_use]
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.width() <= width {
        return single_line;
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in single_line.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Single-line entity summary.
///
/// Format: `{badge} {id} [{type}] {name}` plus ` | Folder: {folder}` when
/// `folder` is given.
#[must_use]
pub fn format_item_line(item: &Item<'_>, folder: Option<&str>) -> String {
    let mut line = format!(
        "{} {} [{}] {}",
        format_status_badge(item.paused()),
        item.id().unwrap_or("-"),
        item.entity_type().unwrap_or("?"),
        item.name().unwrap_or("(unnamed)"),
    );
    if let Item::Variable(v) = item {
        let _ = write!(line, " ({})", v.variable_type());
    }
    if let Some(folder) = folder {
        let _ = write!(line, " | Folder: {folder}");
    }
    line
}

/// Two-line change preview: description, then `old → new`.
#[must_use]
pub fn format_change(index: usize, change: &Change) -> String {
    let old = if change.old_value.is_empty() {
        "(empty)".to_string()
    } else {
        truncate_to_width(&change.old_value, VALUE_WIDTH)
    };
    format!(
        "{}. {}\n   {} → {}",
        index + 1,
        change.description,
        old,
        truncate_to_width(&change.new_value, VALUE_WIDTH),
    )
}

/// Multi-line container summary.
#[must_use]
pub fn format_summary(summary: &ContainerSummary) -> String {
    format!(
        "{}\n  Container ID: {}\n  Version:      {}\n  Account ID:   {}\n  Format:       {}\n\n  Tags: {}  Triggers: {}  Variables: {}  Folders: {}",
        summary.name,
        summary.container_id,
        summary.version_id,
        summary.account_id,
        summary.export_format,
        summary.tags,
        summary.triggers,
        summary.variables,
        summary.folders,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtm_lib::model::Tag;
    use gtm_lib::{ChangeTarget, ContainerStore, EntityKind};

    fn make_test_tag(paused: bool) -> Tag {
        Tag {
            tag_id: Some("7".to_string()),
            name: Some("CallRail".to_string()),
            tag_type: Some("html".to_string()),
            paused: Some(paused),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_badges() {
        assert_eq!(format_status_badge(false), "●");
        assert_eq!(format_status_badge(true), "○");
    }

    #[test]
    fn test_format_item_line_tag() {
        let tag = make_test_tag(false);
        assert_eq!(format_item_line(&Item::Tag(&tag), None), "● 7 [html] CallRail");

        let paused = make_test_tag(true);
        let line = format_item_line(&Item::Tag(&paused), Some("Ads"));
        assert_eq!(line, "○ 7 [html] CallRail | Folder: Ads");
    }

    #[test]
    fn test_format_item_line_variable_shows_source() {
        let store = ContainerStore::from_json(
            r#"{"containerVersion": {"builtInVariable": [{"name": "Page URL", "type": "PAGE_URL", "builtInVariableId": "b1"}]}}"#,
        )
        .unwrap();
        let items = store.items(EntityKind::Variable);
        assert_eq!(
            format_item_line(&items[0], None),
            "● b1 [PAGE_URL] Page URL (built-in)"
        );
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("a\nb", 10), "a b");
    }

    #[test]
    fn test_format_change() {
        let change = Change {
            target: ChangeTarget::Tag { index: 0 },
            field: "html".to_string(),
            old_value: String::new(),
            new_value: "G-NEW".to_string(),
            description: "GA4 Measurement ID Variable: GA4".to_string(),
        };
        assert_eq!(
            format_change(0, &change),
            "1. GA4 Measurement ID Variable: GA4\n   (empty) → G-NEW"
        );
    }

    #[test]
    fn test_format_summary_contains_counts() {
        let summary = ContainerStore::new().summary();
        let text = format_summary(&summary);
        assert!(text.starts_with("Unnamed Container"));
        assert!(text.contains("Tags: 0  Triggers: 0  Variables: 0  Folders: 0"));
    }
}
