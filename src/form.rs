//! Whole-form rule documents and the change index built from them.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::FormDepsError;
use crate::types::{CompiledDependencies, ComponentDependencies};

/// Every component's rule bag, keyed by component id.
///
/// Serialized as a plain JSON object:
///
/// ```json
/// {
///   "city": { "filterBy": { "sourceField": "country", "targetParam": "country_id" },
///             "resetOn": ["country"] },
///   "vat":  { "visible": { "type": "fieldValue", "field": "kind", "operator": "equals", "value": "company" } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRules {
    components: BTreeMap<String, ComponentDependencies>,
}

impl FormRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`FormDepsError::Json`] if `input` is not an object of rule
    /// bags.
    pub fn from_json(input: &str) -> Result<Self, FormDepsError> {
        Ok(serde_json::from_str(input)?)
    }

    /// # Errors
    ///
    /// Returns [`FormDepsError::Io`] if the file cannot be read, or
    /// [`FormDepsError::Json`] if its content is not an object of rule bags.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FormDepsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add or replace a component's rule bag.
    #[must_use]
    pub fn component(mut self, id: &str, deps: ComponentDependencies) -> Self {
        self.components.insert(id.to_owned(), deps);
        self
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ComponentDependencies> {
        self.components.get(id)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ComponentDependencies> {
        self.components.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// A form's rules compiled once at load time.
///
/// Built by [`Engine::compile_form()`](crate::Engine::compile_form).
#[derive(Debug, Clone, Default)]
pub struct CompiledForm {
    pub(crate) components: BTreeMap<String, CompiledDependencies>,
}

impl CompiledForm {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CompiledDependencies> {
        self.components.get(id)
    }

    /// Component ids, sorted.
    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The dependent fields of one component.
    #[must_use]
    pub fn dependent_fields(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.components.get(id).map(CompiledDependencies::dependent_fields)
    }

    /// Components that must be re-evaluated after `changed` fields were
    /// written.
    ///
    /// A changed key affects a component when one of its dependent fields is
    /// the same key, lies under it (`address` changed, `address.city` read)
    /// or contains it (`address.city` changed, `address` read). Components
    /// that [read all data](CompiledDependencies::reads_all_data) are
    /// affected by any change.
    pub fn affected_by<S: AsRef<str>>(&self, changed: &[S]) -> Vec<&str> {
        let affected: Vec<&str> = self
            .components
            .iter()
            .filter(|(_, deps)| {
                (deps.reads_all_data() && !changed.is_empty())
                    || deps
                        .dependent_fields()
                        .iter()
                        .any(|field| changed.iter().any(|c| overlaps(field, c.as_ref())))
            })
            .map(|(id, _)| id.as_str())
            .collect();
        trace!(
            changed = changed.len(),
            affected = affected.len(),
            "computed affected components"
        );
        affected
    }

    /// Components whose value should be cleared after `changed` fields were
    /// written, per [`should_reset`].
    pub fn resets_for<S: AsRef<str>>(&self, changed: &[S]) -> Vec<&str> {
        self.components
            .iter()
            .filter(|(_, deps)| should_reset(deps.reset_on(), changed))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

fn overlaps(field: &str, changed: &str) -> bool {
    fn nested(inner: &str, outer: &str) -> bool {
        inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.starts_with('.'))
    }
    field == changed || nested(field, changed) || nested(changed, field)
}

/// Whether a component with this `resetOn` list should clear its value after
/// `changed` fields were written. Keys match exactly.
#[must_use]
pub fn should_reset<S: AsRef<str>>(reset_on: &[String], changed: &[S]) -> bool {
    reset_on
        .iter()
        .any(|field| changed.iter().any(|c| c.as_ref() == field))
}
