
use formdeps::{
    CollectingObserver, ComponentDependencies, ConditionKind, EffectiveState, Engine, FormRules,
};
use proptest::prelude::*;
use strategies::{FIELDS, arb_context, arb_dependencies};

fn quiet_engine() -> Engine {
    Engine::builder().observer(CollectingObserver::new()).build()
}

// ---------------------------------------------------------------------------
// Invariant 1: Determinism
//
// The same rules + context must always produce the same state.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn determinism_repeated(deps in arb_dependencies(), ctx in arb_context()) {
        let engine = quiet_engine();
        let compiled = engine.compile(&deps);
        let first = engine.evaluate_compiled(&compiled, &ctx);
        for _ in 0..5 {
            let again = engine.evaluate_compiled(&compiled, &ctx);
            prop_assert_eq!(&first, &again, "determinism violated on repeated evaluation");
        }
    }

    #[test]
    fn determinism_recompile(deps in arb_dependencies(), ctx in arb_context()) {
        let engine = quiet_engine();
        let s1 = engine.evaluate_all(&deps, &ctx);
        let s2 = engine.evaluate_all(&deps, &ctx);
        prop_assert_eq!(s1, s2, "determinism violated across recompilation");
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Disabled coupling
//
// Whenever `enabled` evaluates to false the component is disabled, whatever
// the `disabled` rule says.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn enabled_false_implies_disabled(deps in arb_dependencies(), ctx in arb_context()) {
        let state = quiet_engine().evaluate_all(&deps, &ctx);
        if state.enabled == Some(false) {
            prop_assert_eq!(state.disabled, Some(true));
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Rule independence
//
// Each slot evaluates the same whether its rule stands alone or shares the
// bag with other (possibly broken) rules. `disabled` is the exception, being
// coupled to `enabled`.
// ---------------------------------------------------------------------------

fn only(
    deps: &ComponentDependencies,
    keep: impl FnOnce(&ComponentDependencies, &mut ComponentDependencies),
) -> ComponentDependencies {
    let mut single = ComponentDependencies::default();
    keep(deps, &mut single);
    single
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn slots_are_independent(deps in arb_dependencies(), ctx in arb_context()) {
        let engine = quiet_engine();
        let full = engine.evaluate_all(&deps, &ctx);

        let visible = engine.evaluate_all(&only(&deps, |d, s| s.visible = d.visible.clone()), &ctx);
        prop_assert_eq!(full.visible, visible.visible);

        let required = engine.evaluate_all(&only(&deps, |d, s| s.required = d.required.clone()), &ctx);
        prop_assert_eq!(full.required, required.required);

        let label = engine.evaluate_all(&only(&deps, |d, s| s.label = d.label.clone()), &ctx);
        prop_assert_eq!(&full.label, &label.label);

        let value = engine.evaluate_all(&only(&deps, |d, s| s.value = d.value.clone()), &ctx);
        prop_assert_eq!(&full.value, &value.value);

        let filters = engine.evaluate_all(&only(&deps, |d, s| s.filter_by = d.filter_by.clone()), &ctx);
        prop_assert_eq!(&full.filter_params, &filters.filter_params);
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Filter parameters
//
// `filterParams` is present exactly when a `filterBy` rule is declared, and
// only ever holds declared target parameters. Without transforms, no value
// in it is empty.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn filter_params_presence(deps in arb_dependencies(), ctx in arb_context()) {
        let state = quiet_engine().evaluate_all(&deps, &ctx);
        prop_assert_eq!(state.filter_params.is_some(), deps.filter_by.is_some());
    }

    #[test]
    fn filter_params_keys_are_declared(deps in arb_dependencies(), ctx in arb_context()) {
        let state = quiet_engine().evaluate_all(&deps, &ctx);
        if let (Some(params), Some(filter_by)) = (&state.filter_params, &deps.filter_by) {
            for key in params.keys() {
                prop_assert!(
                    filter_by.entries().iter().any(|e| &e.target_param == key),
                    "undeclared parameter {}", key
                );
            }
        }
    }

    #[test]
    fn untransformed_params_are_never_empty(deps in arb_dependencies(), ctx in arb_context()) {
        let Some(filter_by) = &deps.filter_by else { return Ok(()); };
        if filter_by.entries().iter().any(|e| e.transform.is_some()) {
            return Ok(());
        }
        let params = quiet_engine().build_params(filter_by, ctx.data());
        for (key, value) in &params {
            prop_assert!(
                !formdeps::path::is_empty(Some(value)),
                "empty value for {}: {}", key, value
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 5: Dependency extraction covers declared fields
//
// Every `fieldValue` field, every `resetOn` key and every filter source is a
// dependent field.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn declared_fields_are_dependent(deps in arb_dependencies()) {
        let fields = quiet_engine().dependent_fields(&deps);

        let gates = [&deps.disabled, &deps.enabled, &deps.visible, &deps.required];
        for condition in gates.into_iter().flatten() {
            if let ConditionKind::FieldValue { field, .. } = &condition.kind {
                prop_assert!(fields.contains(field), "missing gate field {}", field);
            }
        }
        for key in &deps.reset_on {
            prop_assert!(fields.contains(key), "missing resetOn key {}", key);
        }
        if let Some(filter_by) = &deps.filter_by {
            for entry in filter_by.entries() {
                prop_assert!(
                    fields.contains(&entry.source_field),
                    "missing filter source {}", entry.source_field
                );
            }
        }
    }

    #[test]
    fn extraction_matches_engine(deps in arb_dependencies()) {
        prop_assert_eq!(
            formdeps::extract_dependent_fields(&deps),
            quiet_engine().dependent_fields(&deps)
        );
    }
}

// ---------------------------------------------------------------------------
// Invariant 6: Whole-form evaluation
//
// Evaluating a compiled form gives each component the same state as
// evaluating it alone, and a change-driven pass only recomputes components
// whose dependent fields overlap the change or that read all of `data`.
// ---------------------------------------------------------------------------

fn arb_form() -> impl Strategy<Value = FormRules> {
    prop::collection::vec(arb_dependencies(), 1..5).prop_map(|bags| {
        bags.into_iter()
            .enumerate()
            .fold(FormRules::new(), |form, (i, deps)| form.component(&format!("c{i}"), deps))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn form_matches_components(rules in arb_form(), ctx in arb_context()) {
        let engine = quiet_engine();
        let form = engine.compile_form(&rules);
        let states = engine.evaluate_form(&form, &ctx);
        prop_assert_eq!(states.len(), rules.len());
        for (id, deps) in rules.iter() {
            let alone: EffectiveState = engine.evaluate_all(deps, &ctx);
            prop_assert_eq!(states.get(id), Some(&alone), "component {}", id);
        }
    }

    #[test]
    fn changed_pass_is_a_subset(
        rules in arb_form(),
        ctx in arb_context(),
        changed in prop::sample::subsequence(FIELDS, 0..3),
    ) {
        let engine = quiet_engine();
        let form = engine.compile_form(&rules);
        let all = engine.evaluate_form(&form, &ctx);
        let partial = engine.evaluate_changed(&form, &ctx, &changed);
        for (id, state) in &partial {
            prop_assert_eq!(all.get(id), Some(state));
            let fields = form.dependent_fields(id).cloned().unwrap_or_default();
            let reads_all = form.get(id).is_some_and(|d| d.reads_all_data());
            prop_assert!(
                reads_all || fields.iter().any(|f| changed.iter().any(|c| f == c
                    || f.starts_with(&format!("{c}."))
                    || c.starts_with(&format!("{f}.")))),
                "component {} recomputed without a dependency on {:?}", id, changed
            );
        }
    }
}
