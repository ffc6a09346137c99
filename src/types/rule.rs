use std::collections::BTreeSet;

use super::expr::Expr;
use super::function_registry::RegisteredFunction;
use super::{Operator, Value};

/// A rule body after load-time compilation.
///
/// Sources that fail to compile are kept as `Broken` so the failure surfaces
/// (and falls back to the default) each time the rule is evaluated, exactly
/// like a body that fails at run time.
#[derive(Debug, Clone)]
pub(crate) enum CompiledRule {
    Expr(Expr),
    Function(RegisteredFunction),
    Broken {
        source: String,
        error: super::RuleError,
    },
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledConditionKind {
    FieldValue {
        field: String,
        operator: Operator,
        value: Option<Value>,
    },
    Rule(CompiledRule),
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledCondition {
    pub(crate) kind: CompiledConditionKind,
    pub(crate) default: Option<Value>,
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledPropertyKind {
    Template(String),
    Rule(CompiledRule),
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledProperty {
    pub(crate) kind: CompiledPropertyKind,
    pub(crate) default: Option<Value>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledFilter {
    pub(crate) source_field: String,
    pub(crate) target_param: String,
    pub(crate) transform: Option<CompiledRule>,
}

/// A component's rule bag with every body compiled and its dependent-field
/// set precomputed.
///
/// Immutable and `Send + Sync`; compile once per form load and evaluate on
/// every data change with
/// [`Engine::evaluate_compiled()`](crate::Engine::evaluate_compiled).
#[derive(Debug, Clone)]
pub struct CompiledDependencies {
    pub(crate) disabled: Option<CompiledCondition>,
    pub(crate) enabled: Option<CompiledCondition>,
    pub(crate) visible: Option<CompiledCondition>,
    pub(crate) required: Option<CompiledCondition>,
    pub(crate) label: Option<CompiledProperty>,
    pub(crate) placeholder: Option<CompiledProperty>,
    pub(crate) value: Option<CompiledProperty>,
    pub(crate) options: Option<CompiledProperty>,
    pub(crate) filter_by: Option<Vec<CompiledFilter>>,
    pub(crate) reset_on: Vec<String>,
    pub(crate) fields: BTreeSet<String>,
    pub(crate) reads_all: bool,
}

impl CompiledDependencies {
    /// Field keys this component's rules read. A conservative superset.
    #[must_use]
    pub fn dependent_fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    /// Whether some rule reads `data` or `rootData` as a whole (`Boolean(data)`,
    /// `data[key]` with a computed key) or calls a function registered without
    /// declared reads. Such a component is affected by every change, whatever
    /// [`dependent_fields`](Self::dependent_fields) lists.
    #[must_use]
    pub fn reads_all_data(&self) -> bool {
        self.reads_all
    }

    /// Field keys whose change should clear this component's value.
    #[must_use]
    pub fn reset_on(&self) -> &[String] {
        &self.reset_on
    }

    /// Whether this component has a `filterBy` rule.
    #[must_use]
    pub fn has_filter(&self) -> bool {
        self.filter_by.is_some()
    }

    /// Number of rule bodies that failed to compile.
    #[must_use]
    pub fn broken_rules(&self) -> usize {
        let conditions = [&self.disabled, &self.enabled, &self.visible, &self.required]
            .into_iter()
            .flatten()
            .filter(|c| matches!(c.kind, CompiledConditionKind::Rule(CompiledRule::Broken { .. })))
            .count();
        let properties = [&self.label, &self.placeholder, &self.value, &self.options]
            .into_iter()
            .flatten()
            .filter(|p| matches!(p.kind, CompiledPropertyKind::Rule(CompiledRule::Broken { .. })))
            .count();
        let transforms = self
            .filter_by
            .iter()
            .flatten()
            .filter(|f| matches!(f.transform, Some(CompiledRule::Broken { .. })))
            .count();
        conditions + properties + transforms
    }
}
