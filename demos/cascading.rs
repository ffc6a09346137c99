use formdeps::{
    ComponentDependencies, DependencyCondition, Engine, EvaluationContext, FilterBy,
    FilterDependency, Operator,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = Engine::default();

    // City list constrained by the selected country and region.
    let city = ComponentDependencies {
        enabled: Some(DependencyCondition::field("country", Operator::NotEmpty)),
        filter_by: Some(FilterBy::from(vec![
            FilterDependency::new("country", "country_id"),
            FilterDependency::new("region", "region_code")
                .with_transform("return value.trim().toUpperCase();"),
        ])),
        reset_on: vec!["country".into(), "region".into()],
        ..Default::default()
    };

    println!("Dependent fields: {:?}", engine.dependent_fields(&city));

    let steps = [
        EvaluationContext::new(),
        EvaluationContext::new().set("country", "NO"),
        EvaluationContext::new()
            .set("country", "NO")
            .set("region", " vestland "),
    ];

    for ctx in &steps {
        let state = engine.evaluate_all(&city, ctx);
        println!("data = {}", ctx.data());
        println!("  {state}");
    }

    let changed = ["country"];
    println!(
        "Reset city after {changed:?}: {}",
        formdeps::should_reset(&city.reset_on, &changed)
    );
}
