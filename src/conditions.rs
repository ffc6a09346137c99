use crate::observer::RuleSlot;
use crate::path;
use crate::runtime::Runtime;
use crate::types::rule::{CompiledCondition, CompiledConditionKind};
use crate::types::value::{display, number_of};
use crate::types::{EvaluationContext, Operator, Scope, Value};

/// Evaluate one gate rule.
///
/// `fieldValue` conditions always produce a boolean. Expression and function
/// rules produce whatever their body returns, or the declared default when
/// the body fails.
pub(crate) fn evaluate_condition(
    rt: &Runtime<'_>,
    condition: &CompiledCondition,
    ctx: &EvaluationContext,
    slot: RuleSlot,
) -> Option<Value> {
    match &condition.kind {
        CompiledConditionKind::FieldValue {
            field,
            operator,
            value,
        } => {
            let actual = path::get(ctx.data(), field);
            Some(Value::Bool(test(*operator, actual, value.as_ref())))
        }
        CompiledConditionKind::Rule(rule) => rt.run_or(
            rule,
            Scope::for_context(ctx),
            slot,
            condition.default.as_ref(),
        ),
    }
}

/// Apply a `fieldValue` operator to the resolved field value.
pub(crate) fn test(operator: Operator, actual: Option<&Value>, expected: Option<&Value>) -> bool {
    match operator {
        Operator::Equals => actual == expected,
        Operator::NotEquals => actual != expected,
        Operator::Contains => contains(actual, expected),
        Operator::NotContains => !contains(actual, expected),
        Operator::Gt => number_of(actual) > number_of(expected),
        Operator::Gte => number_of(actual) >= number_of(expected),
        Operator::Lt => number_of(actual) < number_of(expected),
        Operator::Lte => number_of(actual) <= number_of(expected),
        Operator::Empty => path::is_empty(actual),
        Operator::NotEmpty => !path::is_empty(actual),
        Operator::In => member_of(actual, expected),
        Operator::NotIn => !member_of(actual, expected),
    }
}

fn contains(actual: Option<&Value>, expected: Option<&Value>) -> bool {
    match actual {
        Some(Value::Array(items)) => expected.is_some_and(|e| items.contains(e)),
        Some(Value::String(s)) => s.contains(&display(expected)),
        _ => false,
    }
}

fn member_of(actual: Option<&Value>, expected: Option<&Value>) -> bool {
    match (actual, expected) {
        (Some(a), Some(Value::Array(items))) => items.contains(a),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: impl Into<Value>) -> Option<Value> {
        Some(x.into())
    }

    fn check(op: Operator, actual: Option<Value>, expected: Option<Value>) -> bool {
        test(op, actual.as_ref(), expected.as_ref())
    }

    #[test]
    fn equals_is_strict() {
        assert!(check(Operator::Equals, v("A"), v("A")));
        assert!(!check(Operator::Equals, v("B"), v("A")));
        assert!(!check(Operator::Equals, v(1_i64), v("1")));
        assert!(check(Operator::NotEquals, v(1_i64), v("1")));
    }

    #[test]
    fn contains_on_arrays_and_strings() {
        assert!(check(Operator::Contains, v(vec!["a", "b"]), v("b")));
        assert!(check(Operator::Contains, v("hello"), v("ell")));
        assert!(!check(Operator::Contains, v(5_i64), v("5")));
        assert!(check(Operator::NotContains, v(5_i64), v("5")));
        assert!(check(Operator::NotContains, None, v("x")));
    }

    #[test]
    fn numeric_comparisons_coerce() {
        assert!(check(Operator::Gt, v("10"), v(9_i64)));
        assert!(check(Operator::Lte, v(3_i64), v(3_i64)));
        assert!(!check(Operator::Gt, v("abc"), v(1_i64)));
        assert!(!check(Operator::Lt, v("abc"), v(1_i64)));
        assert!(!check(Operator::Gte, None, v(0_i64)));
    }

    #[test]
    fn emptiness() {
        assert!(check(Operator::Empty, None, None));
        assert!(check(Operator::Empty, v("  "), None));
        assert!(!check(Operator::NotEmpty, None, None));
        assert!(check(Operator::NotEmpty, v(0_i64), None));
        assert!(check(Operator::NotEmpty, v(false), None));
    }

    #[test]
    fn membership() {
        assert!(check(Operator::In, v("b"), v(vec!["a", "b"])));
        assert!(!check(Operator::In, v("c"), v(vec!["a", "b"])));
        assert!(!check(Operator::In, v("a"), v("abc")));
        assert!(check(Operator::NotIn, v("a"), v("abc")));
        assert!(!check(Operator::In, None, v(vec!["a"])));
    }
}
