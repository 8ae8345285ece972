//! Writing reconciled values back into entities.
//!
//! Variables keep their value in one of several places depending on their
//! GTM type. The places are tried as an ordered pipeline
//! ([`VARIABLE_WRITE_CHAIN`]); the first one that exists is used for both
//! reading the current value and writing the new one.

use serde::Serialize;
use serde_json::Value;

use crate::changeset::{Change, ChangeTarget};
use crate::model::{ContainerVersion, Parameter, Tag, Variable, value_as_string};
use crate::normalize::variable_at_mut;

const DEFAULT_VALUE: &str = "defaultValue";
const VALUE: &str = "value";
const HTML_KEYS: [&str; 2] = ["html", "customHtml"];

/// One place a variable's value may live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableWriteStrategy {
    /// Existing parameter keyed `defaultValue`.
    DefaultValueParameter,
    /// Existing parameter keyed `value`.
    ValueParameter,
    /// Own top-level `defaultValue` field.
    DefaultValueField,
    /// New `{key: defaultValue, type: template}` parameter.
    AppendDefaultValueParameter,
}

/// Strategies in precedence order. The last one always applies.
pub const VARIABLE_WRITE_CHAIN: [VariableWriteStrategy; 4] = [
    VariableWriteStrategy::DefaultValueParameter,
    VariableWriteStrategy::ValueParameter,
    VariableWriteStrategy::DefaultValueField,
    VariableWriteStrategy::AppendDefaultValueParameter,
];

impl VariableWriteStrategy {
    /// Whether this strategy can locate a field on `variable`.
    #[must_use]
    pub fn applies_to(&self, variable: &Variable) -> bool {
        match self {
            Self::DefaultValueParameter => find_param(variable, DEFAULT_VALUE).is_some(),
            Self::ValueParameter => find_param(variable, VALUE).is_some(),
            Self::DefaultValueField => variable.extra.contains_key(DEFAULT_VALUE),
            Self::AppendDefaultValueParameter => true,
        }
    }

    fn read(&self, variable: &Variable) -> Option<String> {
        match self {
            Self::DefaultValueParameter => find_param(variable, DEFAULT_VALUE)?.value.clone(),
            Self::ValueParameter => find_param(variable, VALUE)?.value.clone(),
            Self::DefaultValueField => value_as_string(variable.extra.get(DEFAULT_VALUE)?),
            Self::AppendDefaultValueParameter => None,
        }
    }

    fn write(&self, variable: &mut Variable, new_value: &str) {
        match self {
            Self::DefaultValueParameter | Self::ValueParameter => {
                let key = if *self == Self::DefaultValueParameter {
                    DEFAULT_VALUE
                } else {
                    VALUE
                };
                if let Some(param) = variable
                    .parameter
                    .as_mut()
                    .and_then(|params| params.iter_mut().find(|p| p.has_key(key)))
                {
                    param.value = Some(new_value.to_string());
                }
            }
            Self::DefaultValueField => {
                variable.extra.insert(
                    DEFAULT_VALUE.to_string(),
                    Value::String(new_value.to_string()),
                );
            }
            Self::AppendDefaultValueParameter => {
                variable
                    .parameter
                    .get_or_insert_with(Vec::new)
                    .push(Parameter::template(DEFAULT_VALUE, new_value));
            }
        }
    }
}

fn find_param<'a>(variable: &'a Variable, key: &str) -> Option<&'a Parameter> {
    variable.parameter.as_ref()?.iter().find(|p| p.has_key(key))
}

/// First strategy in the chain that applies to `variable`.
#[must_use]
pub fn resolve_strategy(variable: &Variable) -> VariableWriteStrategy {
    VARIABLE_WRITE_CHAIN
        .into_iter()
        .find(|s| s.applies_to(variable))
        .unwrap_or(VariableWriteStrategy::AppendDefaultValueParameter)
}

/// Current value as seen by the write chain; "" when nothing holds one.
#[must_use]
pub fn read_variable_value(variable: &Variable) -> String {
    resolve_strategy(variable)
        .read(variable)
        .unwrap_or_default()
}

/// Write `new_value` through the chain, returning the strategy used.
pub fn write_variable_value(variable: &mut Variable, new_value: &str) -> VariableWriteStrategy {
    let strategy = resolve_strategy(variable);
    strategy.write(variable, new_value);
    strategy
}

/// The tag's `html`/`customHtml` parameter, if any.
#[must_use]
pub fn tag_html_param(tag: &Tag) -> Option<&Parameter> {
    tag.parameter
        .as_ref()?
        .iter()
        .find(|p| HTML_KEYS.iter().any(|k| p.has_key(k)))
}

/// Overwrite the tag's HTML parameter. Tags never gain one; returns
/// `false` when there is none.
pub fn write_tag_html(tag: &mut Tag, new_value: &str) -> bool {
    let Some(param) = tag
        .parameter
        .as_mut()
        .and_then(|params| params.iter_mut().find(|p| HTML_KEYS.iter().any(|k| p.has_key(k))))
    else {
        return false;
    };
    param.value = Some(new_value.to_string());
    true
}

/// Outcome of applying one change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ApplyOutcome {
    Variable { strategy: VariableWriteStrategy },
    Tag,
    /// Tag without an HTML parameter.
    NoHtmlParameter,
    /// Key no longer resolves (entity deleted since the change was built).
    StaleTarget,
}

impl ApplyOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Variable { .. } | Self::Tag)
    }
}

/// Per-change outcomes, in change order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    pub outcomes: Vec<(String, ApplyOutcome)>,
}

impl ApplyReport {
    #[must_use]
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_applied()).count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.applied()
    }
}

/// Apply `changes` to `version`, consuming them.
///
/// Re-applying the same changes writes the same values again.
pub fn apply_changes(version: &mut ContainerVersion, changes: Vec<Change>) -> ApplyReport {
    let mut report = ApplyReport::default();

    for change in changes {
        let outcome = match change.target {
            ChangeTarget::Variable(key) => match variable_at_mut(version, key) {
                Some(variable) => ApplyOutcome::Variable {
                    strategy: write_variable_value(variable, &change.new_value),
                },
                None => ApplyOutcome::StaleTarget,
            },
            ChangeTarget::Tag { index } => match version.tags_mut().and_then(|t| t.get_mut(index)) {
                Some(tag) => {
                    if write_tag_html(tag, &change.new_value) {
                        ApplyOutcome::Tag
                    } else {
                        ApplyOutcome::NoHtmlParameter
                    }
                }
                None => ApplyOutcome::StaleTarget,
            },
        };

        if outcome.is_applied() {
            tracing::info!(change = %change.description, new_value = %change.new_value, "applied change");
        } else {
            tracing::warn!(change = %change.description, ?outcome, "change skipped");
        }
        report.outcomes.push((change.description, outcome));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VariableSource;
    use crate::normalize::VariableKey;

    fn param(key: &str, value: &str) -> Parameter {
        Parameter {
            key: Some(key.to_string()),
            param_type: Some("template".to_string()),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn variable_change(index: usize, new_value: &str) -> Change {
        Change {
            target: ChangeTarget::Variable(VariableKey {
                source: VariableSource::Custom,
                index,
            }),
            field: "defaultValue".to_string(),
            old_value: String::new(),
            new_value: new_value.to_string(),
            description: format!("change {index}"),
        }
    }

    #[test]
    fn test_default_value_parameter_wins_over_bare_field() {
        let mut var = Variable {
            parameter: Some(vec![param("defaultValue", "old")]),
            ..Default::default()
        };
        var.extra
            .insert("defaultValue".to_string(), Value::String("bare".to_string()));

        let used = write_variable_value(&mut var, "new");
        assert_eq!(used, VariableWriteStrategy::DefaultValueParameter);
        assert_eq!(var.parameter.as_ref().unwrap()[0].value.as_deref(), Some("new"));
        assert_eq!(var.extra["defaultValue"], "bare");
    }

    #[test]
    fn test_value_parameter_second() {
        let mut var = Variable {
            parameter: Some(vec![param("name", "x"), param("value", "old")]),
            ..Default::default()
        };
        assert_eq!(read_variable_value(&var), "old");
        assert_eq!(
            write_variable_value(&mut var, "new"),
            VariableWriteStrategy::ValueParameter
        );
        assert_eq!(var.parameter.as_ref().unwrap()[1].value.as_deref(), Some("new"));
    }

    #[test]
    fn test_bare_field_third() {
        let mut var = Variable::default();
        var.extra.insert("defaultValue".to_string(), Value::Null);
        assert_eq!(read_variable_value(&var), "");
        assert_eq!(
            write_variable_value(&mut var, "new"),
            VariableWriteStrategy::DefaultValueField
        );
        assert_eq!(var.extra["defaultValue"], "new");
        assert!(var.parameter.is_none());
    }

    #[test]
    fn test_appends_parameter_when_nothing_exists() {
        let mut var = Variable {
            parameter: Some(vec![param("other", "x")]),
            ..Default::default()
        };
        assert_eq!(read_variable_value(&var), "");
        write_variable_value(&mut var, "G-1");
        let params = var.parameter.as_ref().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[1], Parameter::template("defaultValue", "G-1"));
    }

    #[test]
    fn test_tag_without_html_param_is_noop() {
        let mut tag = Tag {
            parameter: Some(vec![param("url", "x")]),
            ..Default::default()
        };
        assert!(!write_tag_html(&mut tag, "<script>"));
        assert_eq!(tag.parameter.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_tag_custom_html_key() {
        let mut tag = Tag {
            parameter: Some(vec![param("customHtml", "<old>")]),
            ..Default::default()
        };
        assert!(write_tag_html(&mut tag, "<new>"));
        assert_eq!(tag_html_param(&tag).unwrap().value.as_deref(), Some("<new>"));
    }

    #[test]
    fn test_apply_is_idempotent_and_touches_only_target() {
        let mut cv = ContainerVersion {
            variable: Some(vec![
                Variable {
                    parameter: Some(vec![param("defaultValue", "a")]),
                    ..Default::default()
                },
                Variable {
                    parameter: Some(vec![param("defaultValue", "b")]),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        let changes = vec![variable_change(1, "B2")];

        let first = apply_changes(&mut cv, changes.clone());
        let snapshot = cv.clone();
        let second = apply_changes(&mut cv, changes);

        assert_eq!(first.applied(), 1);
        assert_eq!(second.applied(), 1);
        assert_eq!(cv, snapshot);
        let vars = cv.variable.as_ref().unwrap();
        assert_eq!(read_variable_value(&vars[0]), "a");
        assert_eq!(read_variable_value(&vars[1]), "B2");
    }

    #[test]
    fn test_stale_target_is_skipped() {
        let mut cv = ContainerVersion::default();
        let report = apply_changes(&mut cv, vec![variable_change(3, "x")]);
        assert_eq!(report.applied(), 0);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.outcomes[0].1, ApplyOutcome::StaleTarget);
    }

    #[test]
    fn test_apply_tag_change_with_and_without_html() {
        let tag_change = |index| Change {
            target: ChangeTarget::Tag { index },
            field: "html".to_string(),
            old_value: String::new(),
            new_value: "<script src='//cdn.callrail.com/new.js'></script>".to_string(),
            description: format!("CallRail HTML Tag: {index}"),
        };
        let mut cv = ContainerVersion {
            tag: Some(vec![
                Tag {
                    tag_type: Some("html".to_string()),
                    parameter: Some(vec![param("html", "<old>")]),
                    ..Default::default()
                },
                Tag {
                    tag_type: Some("html".to_string()),
                    parameter: Some(vec![param("supportDocumentWrite", "false")]),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };

        let report = apply_changes(&mut cv, vec![tag_change(0), tag_change(1)]);
        assert_eq!(report.outcomes[0].1, ApplyOutcome::Tag);
        assert_eq!(report.outcomes[1].1, ApplyOutcome::NoHtmlParameter);
        assert_eq!(report.applied(), 1);

        let tags = cv.tag.as_ref().unwrap();
        assert_eq!(
            tag_html_param(&tags[0]).unwrap().value.as_deref(),
            Some("<script src='//cdn.callrail.com/new.js'></script>")
        );
        assert_eq!(tags[1].parameter.as_ref().unwrap().len(), 1);
    }
}
