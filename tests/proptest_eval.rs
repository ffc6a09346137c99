
use formdeps::parse::parse_expression;
use formdeps::{
    CollectingObserver, DependencyCondition, Engine, EvaluationContext, Operator, Value,
};
use proptest::prelude::*;
use strategies::{FIELDS, arb_context, arb_expression_text, arb_nesting_bomb, arb_value};

fn quiet_engine() -> Engine {
    Engine::builder().observer(CollectingObserver::new()).build()
}

proptest! {
    /// Parsing arbitrary text never panics.
    #[test]
    fn parse_never_panics(source in "\\PC{0,64}") {
        let _ = parse_expression(&source);
    }

    /// Sources nested past the depth limit are rejected, not overflowed, and
    /// the rule falls back to its default.
    #[test]
    fn deep_nesting_uses_default(source in arb_nesting_bomb(), ctx in arb_context()) {
        prop_assert!(parse_expression(&source).is_err());
        let engine = quiet_engine();
        let condition = DependencyCondition::expression(&source).with_default("deep");
        prop_assert_eq!(
            engine.evaluate_condition(&condition, &ctx),
            Some(Value::from("deep"))
        );
    }

    /// Generated expressions evaluate without panicking, whatever the data.
    #[test]
    fn eval_never_panics(source in arb_expression_text(), ctx in arb_context()) {
        let engine = quiet_engine();
        let _ = engine.evaluate_condition(&DependencyCondition::expression(&source), &ctx);
    }

    /// A parsed expression re-parses from its display form to the same tree.
    #[test]
    fn display_round_trips(source in arb_expression_text()) {
        if let Ok(expr) = parse_expression(&source) {
            let reparsed = parse_expression(&expr.to_string());
            prop_assert_eq!(reparsed.as_ref().ok(), Some(&expr), "display: {}", expr);
        }
    }

    /// `!!x` agrees with the truthiness of `x`.
    #[test]
    fn double_negation(source in arb_expression_text(), ctx in arb_context()) {
        let engine = quiet_engine();
        let plain = engine.evaluate_condition(&DependencyCondition::expression(&source), &ctx);
        let negated = engine.evaluate_condition(
            &DependencyCondition::expression(&format!("!!({source})")),
            &ctx,
        );
        if let Some(plain) = plain {
            prop_assert_eq!(negated, Some(Value::Bool(plain.is_truthy())));
        }
    }

    /// `empty` and `notEmpty` always disagree.
    #[test]
    fn empty_and_not_empty_are_complements(
        field in prop::sample::select(FIELDS),
        ctx in arb_context(),
    ) {
        let engine = quiet_engine();
        let empty = engine.evaluate_condition(&DependencyCondition::field(field, Operator::Empty), &ctx);
        let not_empty = engine.evaluate_condition(&DependencyCondition::field(field, Operator::NotEmpty), &ctx);
        prop_assert_ne!(empty, not_empty);
    }

    /// `equals` and `notEquals` always disagree.
    #[test]
    fn equals_and_not_equals_are_complements(
        field in prop::sample::select(FIELDS),
        value in arb_value(),
        ctx in arb_context(),
    ) {
        let engine = quiet_engine();
        let eq = engine.evaluate_condition(
            &DependencyCondition::field_value(field, Operator::Equals, value.clone()),
            &ctx,
        );
        let neq = engine.evaluate_condition(
            &DependencyCondition::field_value(field, Operator::NotEquals, value),
            &ctx,
        );
        prop_assert_ne!(eq, neq);
    }

    /// A stored value always `equals` itself.
    #[test]
    fn equals_is_reflexive(value in arb_value()) {
        let engine = quiet_engine();
        let ctx = EvaluationContext::new().set("x", value.clone());
        prop_assert_eq!(
            engine.evaluate_condition(&DependencyCondition::field_value("x", Operator::Equals, value), &ctx),
            Some(Value::Bool(true))
        );
    }
}
