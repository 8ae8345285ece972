//! Variable normalization.
//!
//! GTM exports spread variables over up to six sequences with different
//! ID fields. [`normalize_variables`] collapses them into one ordered,
//! deduplicated view. Every consumer (listing, counting, editing,
//! reconciliation) must read variables through it so counts and edit
//! targets agree.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{ContainerVersion, Entity, Variable, VariableSource, non_empty};

/// Location of a raw variable inside its source sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableKey {
    pub source: VariableSource,
    pub index: usize,
}

/// A borrowed, uniformly shaped view of one raw variable.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedVariable<'a> {
    pub key: VariableKey,
    pub variable: &'a Variable,
    variable_id: Option<&'a str>,
}

impl<'a> NormalizedVariable<'a> {
    /// The `variableType` label.
    #[must_use]
    pub const fn variable_type(&self) -> VariableSource {
        self.key.source
    }

    /// Unified identity after the built-in fallback.
    #[must_use]
    pub const fn variable_id(&self) -> Option<&'a str> {
        self.variable_id
    }

    /// Raw variable plus the normalized `variableType` and `variableId`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self.variable).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "variableType".to_string(),
                serde_json::Value::String(self.variable_type().label().to_string()),
            );
            if let Some(id) = self.variable_id {
                obj.insert(
                    "variableId".to_string(),
                    serde_json::Value::String(id.to_string()),
                );
            }
        }
        value
    }
}

impl Entity for NormalizedVariable<'_> {
    fn name(&self) -> Option<&str> {
        self.variable.name.as_deref()
    }

    fn entity_type(&self) -> Option<&str> {
        self.variable.variable_type.as_deref()
    }

    fn id(&self) -> Option<&str> {
        self.variable_id
    }
}

/// Resolve the identity of a variable read from `source`.
///
/// Built-in sources prefer `builtInVariableId`; custom sources prefer
/// `variableId`. Empty strings count as absent.
#[must_use]
pub fn unified_id(variable: &Variable, source: VariableSource) -> Option<&str> {
    let native = non_empty(variable.variable_id.as_deref());
    let built_in = non_empty(variable.built_in_variable_id.as_deref());
    if source.is_built_in() {
        built_in.or(native)
    } else {
        native.or(built_in)
    }
}

/// Merge and deduplicate all variable sources.
///
/// Sources are concatenated in [`VariableSource::ALL`] order and the first
/// occurrence of each ID is kept. That precedence is an artifact of the
/// concatenation order, nothing more. Variables without any ID are always
/// kept, even when they look identical.
#[must_use]
pub fn normalize_variables(version: Option<&ContainerVersion>) -> Vec<NormalizedVariable<'_>> {
    let Some(version) = version else {
        return Vec::new();
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::new();
    let mut dropped = 0usize;

    for source in VariableSource::ALL {
        for (index, variable) in version.variables_in(source).iter().enumerate() {
            let variable_id = unified_id(variable, source);
            if let Some(id) = variable_id {
                if !seen.insert(id) {
                    dropped += 1;
                    continue;
                }
            }
            merged.push(NormalizedVariable {
                key: VariableKey { source, index },
                variable,
                variable_id,
            });
        }
    }

    tracing::debug!(
        unique = merged.len(),
        duplicates = dropped,
        "normalized variables"
    );
    merged
}

/// Resolve a key back to its raw variable.
#[must_use]
pub fn variable_at(version: &ContainerVersion, key: VariableKey) -> Option<&Variable> {
    version.variables_in(key.source).get(key.index)
}

/// Resolve a key back to its raw variable, mutably.
pub fn variable_at_mut(version: &mut ContainerVersion, key: VariableKey) -> Option<&mut Variable> {
    version.variables_in_mut(key.source)?.get_mut(key.index)
}
