use crate::conditions::evaluate_condition;
use crate::filters::build_params;
use crate::observer::RuleSlot;
use crate::properties::evaluate_property;
use crate::runtime::Runtime;
use crate::types::rule::{CompiledCondition, CompiledProperty};
use crate::types::{CompiledDependencies, EffectiveState, EvaluationContext};

/// Evaluate every rule a component declares.
///
/// Rules are independent: a failing rule leaves its own slot at the default
/// and never affects the others. The one coupling is that `enabled == false`
/// forces `disabled` to `true`.
pub(crate) fn evaluate_all(
    rt: &Runtime<'_>,
    deps: &CompiledDependencies,
    ctx: &EvaluationContext,
) -> EffectiveState {
    let gate = |condition: &Option<CompiledCondition>, slot: RuleSlot| {
        condition
            .as_ref()
            .and_then(|c| evaluate_condition(rt, c, ctx, slot))
            .map(|v| v.is_truthy())
    };
    let property = |property: &Option<CompiledProperty>, slot: RuleSlot| {
        property
            .as_ref()
            .and_then(|p| evaluate_property(rt, p, ctx, slot))
    };

    let mut state = EffectiveState {
        disabled: gate(&deps.disabled, RuleSlot::Disabled),
        enabled: gate(&deps.enabled, RuleSlot::Enabled),
        visible: gate(&deps.visible, RuleSlot::Visible),
        required: gate(&deps.required, RuleSlot::Required),
        label: property(&deps.label, RuleSlot::Label),
        placeholder: property(&deps.placeholder, RuleSlot::Placeholder),
        value: property(&deps.value, RuleSlot::Value),
        options: property(&deps.options, RuleSlot::Options),
        filter_params: deps
            .filter_by
            .as_ref()
            .map(|filters| build_params(rt, filters, ctx.data())),
    };

    if state.enabled == Some(false) {
        state.disabled = Some(true);
    }
    state
}
