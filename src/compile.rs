use tracing::debug;

use crate::config::EngineConfig;
use crate::extract;
use crate::parse::{ParseError, parse_expression_with_depth, parse_function_body_with_depth};
use crate::types::rule::{
    CompiledCondition, CompiledConditionKind, CompiledFilter, CompiledProperty,
    CompiledPropertyKind, CompiledRule,
};
use crate::types::{
    CompiledDependencies, ComponentDependencies, ComputedProperty, ConditionKind,
    DependencyCondition, Expr, FilterDependency, FunctionRegistry, PropertyKind, RuleError,
};

/// Turns rule source text into evaluable rules.
///
/// Compilation never fails: a body that does not parse is kept as a broken
/// rule that reports its error each time it is evaluated.
pub(crate) struct Compiler<'r> {
    registry: &'r FunctionRegistry,
    max_source_len: usize,
    max_depth: usize,
}

impl<'r> Compiler<'r> {
    pub(crate) fn new(registry: &'r FunctionRegistry, config: &EngineConfig) -> Self {
        Self {
            registry,
            max_source_len: config.max_source_len,
            max_depth: config.max_depth,
        }
    }

    /// An `expression` body.
    pub(crate) fn expression(&self, source: &str) -> CompiledRule {
        self.checked(source, parse_expression_with_depth)
    }

    /// A `function` body or filter transform: a registered function name,
    /// else an expression written as a function body.
    pub(crate) fn function(&self, source: &str) -> CompiledRule {
        if let Some(f) = self.registry.get(source.trim()) {
            return CompiledRule::Function(f.clone());
        }
        self.checked(source, parse_function_body_with_depth)
    }

    fn checked(
        &self,
        source: &str,
        parse: fn(&str, usize) -> Result<Expr, ParseError>,
    ) -> CompiledRule {
        let broken = |error: RuleError| CompiledRule::Broken {
            source: source.to_owned(),
            error,
        };
        if source.len() > self.max_source_len {
            return broken(RuleError::SourceTooLong {
                len: source.len(),
                limit: self.max_source_len,
            });
        }
        match parse(source, self.max_depth) {
            Ok(expr) => CompiledRule::Expr(expr),
            Err(e) => broken(RuleError::Syntax {
                message: e.to_string(),
            }),
        }
    }

    pub(crate) fn condition(&self, condition: &DependencyCondition) -> CompiledCondition {
        let kind = match &condition.kind {
            ConditionKind::FieldValue {
                field,
                operator,
                value,
            } => CompiledConditionKind::FieldValue {
                field: field.clone(),
                operator: *operator,
                value: value.clone(),
            },
            ConditionKind::Expression { expression } => {
                CompiledConditionKind::Rule(self.expression(expression))
            }
            ConditionKind::Function { fn_source } => {
                CompiledConditionKind::Rule(self.function(fn_source))
            }
        };
        CompiledCondition {
            kind,
            default: condition.default.clone(),
        }
    }

    pub(crate) fn property(&self, property: &ComputedProperty) -> CompiledProperty {
        let kind = match &property.kind {
            PropertyKind::Template { template } => CompiledPropertyKind::Template(template.clone()),
            PropertyKind::Expression { expression } => {
                CompiledPropertyKind::Rule(self.expression(expression))
            }
            PropertyKind::Function { fn_source } => {
                CompiledPropertyKind::Rule(self.function(fn_source))
            }
        };
        CompiledProperty {
            kind,
            default: property.default.clone(),
        }
    }

    pub(crate) fn filter(&self, filter: &FilterDependency) -> CompiledFilter {
        CompiledFilter {
            source_field: filter.source_field.clone(),
            target_param: filter.target_param.clone(),
            transform: filter.transform.as_deref().map(|t| self.function(t)),
        }
    }

    /// Compile a component's whole rule bag and compute its dependent fields.
    pub(crate) fn dependencies(&self, deps: &ComponentDependencies) -> CompiledDependencies {
        let condition = |c: &Option<DependencyCondition>| c.as_ref().map(|c| self.condition(c));
        let property = |p: &Option<ComputedProperty>| p.as_ref().map(|p| self.property(p));

        let mut compiled = CompiledDependencies {
            disabled: condition(&deps.disabled),
            enabled: condition(&deps.enabled),
            visible: condition(&deps.visible),
            required: condition(&deps.required),
            label: property(&deps.label),
            placeholder: property(&deps.placeholder),
            value: property(&deps.value),
            options: property(&deps.options),
            filter_by: deps
                .filter_by
                .as_ref()
                .map(|f| f.entries().iter().map(|e| self.filter(e)).collect()),
            reset_on: deps.reset_on.clone(),
            fields: Default::default(),
            reads_all: false,
        };
        let reads = extract::collect(&compiled);
        compiled.fields = reads.fields;
        compiled.reads_all = reads.all;

        let broken = compiled.broken_rules();
        if broken > 0 {
            debug!(broken, "compiled component with rules that failed to parse");
        }
        compiled
    }
}
