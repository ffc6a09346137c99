use formdeps::{Engine, EngineConfig, EvaluationContext, FormRules, Value};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rules = FormRules::from_file("demos/customer_form.json").expect("failed to load rules");

    let engine = Engine::builder()
        .config(EngineConfig::default())
        .function_reading("isAdult", &["age"], |scope| {
            let age = scope
                .data()
                .as_object()
                .and_then(|d| d.get("age"))
                .and_then(Value::as_f64);
            Ok(Some(Value::Bool(age.is_some_and(|a| a >= 18.0))))
        })
        .build();
    let form = engine.compile_form(&rules);

    for id in form.component_ids() {
        println!("{id} reads {:?}", form.dependent_fields(id).cloned().unwrap_or_default());
    }
    println!();

    let ctx = EvaluationContext::from(json!({
        "name": "Acme AS",
        "age": 34,
        "kind": "company",
        "country": "NO",
        "orders": [120, 80, 45]
    }));

    for (id, state) in engine.evaluate_form(&form, &ctx) {
        println!("{id}: {state}");
    }
    println!();

    let changed = ["kind"];
    println!("After a change to {changed:?}:");
    for (id, state) in engine.evaluate_changed(&form, &ctx, &changed) {
        println!("  {id}: {state}");
    }
    println!("  reset: {:?}", form.resets_for(&changed));
}
