use crate::observer::RuleSlot;
use crate::runtime::Runtime;
use crate::template;
use crate::types::rule::{CompiledProperty, CompiledPropertyKind};
use crate::types::{EvaluationContext, Scope, Value};

/// Evaluate one computed property (`label`, `placeholder`, `value`,
/// `options`).
pub(crate) fn evaluate_property(
    rt: &Runtime<'_>,
    property: &CompiledProperty,
    ctx: &EvaluationContext,
    slot: RuleSlot,
) -> Option<Value> {
    match &property.kind {
        CompiledPropertyKind::Template(source) => {
            Some(Value::String(template::render(source, ctx)))
        }
        CompiledPropertyKind::Rule(rule) => rt.run_or(
            rule,
            Scope::for_context(ctx),
            slot,
            property.default.as_ref(),
        ),
    }
}
