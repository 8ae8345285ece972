//! Keyword matching of entity names.
//!
//! Loose matching serves single well-known identifiers ("GA4",
//! "Conversion"). Strict matching is for the families of conversion-label
//! variables that differ only by word combinations ("apply" + "start" vs
//! "apply" + "end"), where loose matching would pick the wrong one.

use serde::Serialize;

use crate::model::Entity;

/// How many of the keywords a name must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// At least one keyword.
    Loose,
    /// Every keyword, in any order.
    Strict,
}

impl MatchMode {
    /// Whether `name` satisfies this mode for `keywords`.
    ///
    /// An empty keyword list never matches in either mode.
    #[must_use]
    pub fn matches(&self, name: &str, keywords: &[&str]) -> bool {
        if keywords.is_empty() {
            return false;
        }
        let name = name.to_lowercase();
        let mut hits = keywords.iter().map(|k| name.contains(&k.to_lowercase()));
        match self {
            Self::Loose => hits.any(|hit| hit),
            Self::Strict => hits.all(|hit| hit),
        }
    }
}

/// First item (in input order) whose name matches under `mode`.
pub fn find_match<I, E>(items: I, keywords: &[&str], mode: MatchMode) -> Option<E>
where
    I: IntoIterator<Item = E>,
    E: Entity,
{
    let found = items
        .into_iter()
        .find(|item| item.name().is_some_and(|name| mode.matches(name, keywords)));
    tracing::debug!(
        ?mode,
        keywords = ?keywords,
        found = found.as_ref().and_then(|f| f.name()).unwrap_or("<none>"),
        "pattern search"
    );
    found
}

/// Loose match: name contains any keyword.
pub fn find_by_pattern<I, E>(items: I, keywords: &[&str]) -> Option<E>
where
    I: IntoIterator<Item = E>,
    E: Entity,
{
    find_match(items, keywords, MatchMode::Loose)
}

/// Strict match: name contains every keyword.
pub fn find_by_specific_pattern<I, E>(items: I, keywords: &[&str]) -> Option<E>
where
    I: IntoIterator<Item = E>,
    E: Entity,
{
    find_match(items, keywords, MatchMode::Strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variable;

    fn var(name: &str) -> Variable {
        Variable {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_strict_requires_every_keyword() {
        let items = vec![var("GAds Conversion Label Apply Now Start")];
        assert!(
            find_by_specific_pattern(&items, &["gads", "conversion", "label", "apply", "end"])
                .is_none()
        );
        assert!(
            find_by_specific_pattern(&items, &["gads", "conversion", "label", "apply", "start"])
                .is_some()
        );
    }

    #[test]
    fn test_strict_ignores_keyword_order() {
        let items = vec![var("Start - Apply - Label Conversion GADS")];
        assert!(
            find_by_specific_pattern(&items, &["gads", "conversion", "label", "apply", "start"])
                .is_some()
        );
    }

    #[test]
    fn test_loose_returns_first_match_in_order() {
        let items = vec![var("Page Path"), var("Tracking ID"), var("GA4 - Measurement ID")];
        let found = find_by_pattern(&items, &["ga4", "measurement", "tracking"]).unwrap();
        assert_eq!(found.name.as_deref(), Some("Tracking ID"));
    }

    #[test]
    fn test_loose_no_match() {
        let items = vec![var("Page Path")];
        assert!(find_by_pattern(&items, &["ga4"]).is_none());
    }

    #[test]
    fn test_unnamed_items_never_match() {
        let items = vec![Variable::default()];
        assert!(find_by_pattern(&items, &["anything"]).is_none());
    }

    #[test]
    fn test_empty_keywords_never_match() {
        assert!(!MatchMode::Loose.matches("GA4", &[]));
        assert!(!MatchMode::Strict.matches("GA4", &[]));
    }
}
