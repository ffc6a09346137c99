use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::aggregate;
use crate::compile::Compiler;
use crate::conditions::evaluate_condition;
use crate::config::EngineConfig;
use crate::filters;
use crate::form::{CompiledForm, FormRules};
use crate::observer::{FailureObserver, RuleSlot, TracingObserver};
use crate::properties::evaluate_property;
use crate::runtime::Runtime;
use crate::template;
use crate::types::{
    CompiledDependencies, ComponentDependencies, ComputedProperty, DependencyCondition,
    EffectiveState, EvaluationContext, FilterBy, FunctionRegistry, RuleError, Scope, Value,
};

/// Evaluates form rules.
///
/// Holds the limits, the function registry and the failure observer. Every
/// evaluation is a pure function of the rules and the context, so an `Engine`
/// can be shared freely between threads.
///
/// ```
/// use formdeps::{ComponentDependencies, DependencyCondition, Engine, EvaluationContext, Operator};
///
/// let engine = Engine::default();
/// let deps = ComponentDependencies {
///     visible: Some(DependencyCondition::field_value("kind", Operator::Equals, "company")),
///     ..Default::default()
/// };
/// let state = engine.evaluate_all(&deps, &EvaluationContext::new().set("kind", "company"));
/// assert_eq!(state.visible, Some(true));
/// ```
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    registry: FunctionRegistry,
    observer: Arc<dyn FailureObserver>,
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Engine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    fn compiler(&self) -> Compiler<'_> {
        Compiler::new(&self.registry, &self.config)
    }

    fn runtime(&self) -> Runtime<'_> {
        Runtime::new(self.config.max_steps, self.observer.as_ref())
    }

    /// Compile a component's rules for repeated evaluation.
    #[must_use]
    pub fn compile(&self, deps: &ComponentDependencies) -> CompiledDependencies {
        self.compiler().dependencies(deps)
    }

    /// Evaluate a single gate rule.
    ///
    /// `fieldValue` conditions yield a boolean; expression and function rules
    /// yield their body's result, or the declared default if the body fails.
    #[must_use]
    pub fn evaluate_condition(
        &self,
        condition: &DependencyCondition,
        ctx: &EvaluationContext,
    ) -> Option<Value> {
        let compiled = self.compiler().condition(condition);
        evaluate_condition(&self.runtime(), &compiled, ctx, RuleSlot::Standalone)
    }

    /// Evaluate a single computed property.
    #[must_use]
    pub fn evaluate_computed(
        &self,
        property: &ComputedProperty,
        ctx: &EvaluationContext,
    ) -> Option<Value> {
        let compiled = self.compiler().property(property);
        evaluate_property(&self.runtime(), &compiled, ctx, RuleSlot::Standalone)
    }

    /// Render a `{path}` template. See [`template::render`].
    #[must_use]
    pub fn render_template(&self, template: &str, ctx: &EvaluationContext) -> String {
        template::render(template, ctx)
    }

    /// Build cascading-list query parameters from `data`.
    #[must_use]
    pub fn build_params(&self, filter_by: &FilterBy, data: &Value) -> BTreeMap<String, Value> {
        let compiler = self.compiler();
        let compiled: Vec<_> = filter_by
            .entries()
            .iter()
            .map(|entry| compiler.filter(entry))
            .collect();
        filters::build_params(&self.runtime(), &compiled, data)
    }

    /// Data keys a component's rules read, including the fields declared by
    /// registered functions.
    ///
    /// Whole-`data` reads have no key here; see
    /// [`CompiledDependencies::reads_all_data`].
    #[must_use]
    pub fn dependent_fields(&self, deps: &ComponentDependencies) -> BTreeSet<String> {
        self.compile(deps).fields
    }

    /// Compile and evaluate every rule of one component.
    pub fn evaluate_all(
        &self,
        deps: &ComponentDependencies,
        ctx: &EvaluationContext,
    ) -> EffectiveState {
        self.evaluate_compiled(&self.compile(deps), ctx)
    }

    /// Evaluate a component compiled earlier with [`compile`](Self::compile).
    pub fn evaluate_compiled(
        &self,
        deps: &CompiledDependencies,
        ctx: &EvaluationContext,
    ) -> EffectiveState {
        aggregate::evaluate_all(&self.runtime(), deps, ctx)
    }

    /// Compile every component of a form.
    #[must_use]
    pub fn compile_form(&self, rules: &FormRules) -> CompiledForm {
        let compiler = self.compiler();
        let components: BTreeMap<String, CompiledDependencies> = rules
            .iter()
            .map(|(id, deps)| (id.clone(), compiler.dependencies(deps)))
            .collect();
        let broken: usize = components
            .values()
            .map(CompiledDependencies::broken_rules)
            .sum();
        debug!(components = components.len(), broken, "compiled form rules");
        CompiledForm { components }
    }

    /// Evaluate every component of a form.
    #[must_use]
    pub fn evaluate_form(
        &self,
        form: &CompiledForm,
        ctx: &EvaluationContext,
    ) -> BTreeMap<String, EffectiveState> {
        let rt = self.runtime();
        form.components
            .iter()
            .map(|(id, deps)| {
                let state = aggregate::evaluate_all(&rt.for_component(id), deps, ctx);
                (id.clone(), state)
            })
            .collect()
    }

    /// Evaluate only the components affected by `changed` fields.
    #[must_use]
    pub fn evaluate_changed<S: AsRef<str>>(
        &self,
        form: &CompiledForm,
        ctx: &EvaluationContext,
        changed: &[S],
    ) -> BTreeMap<String, EffectiveState> {
        let rt = self.runtime();
        form.affected_by(changed)
            .into_iter()
            .filter_map(|id| {
                let deps = form.get(id)?;
                let state = aggregate::evaluate_all(&rt.for_component(id), deps, ctx);
                Some((id.to_owned(), state))
            })
            .collect()
    }
}

/// Fluent constructor for [`Engine`].
///
/// ```
/// use formdeps::{Engine, Value};
///
/// let engine = Engine::builder()
///     .max_steps(1_000)
///     .function_reading("isAdult", &["age"], |scope| {
///         let age = scope.data().as_object().and_then(|d| d.get("age")).and_then(Value::as_f64);
///         Ok(Some(Value::Bool(age.is_some_and(|a| a >= 18.0))))
///     })
///     .build();
/// assert!(engine.registry().contains("isAdult"));
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    registry: FunctionRegistry,
    observer: Option<Arc<dyn FailureObserver>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all limits at once.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn max_source_len(mut self, max_source_len: usize) -> Self {
        self.config.max_source_len = max_source_len;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Where rule failures go. Defaults to [`TracingObserver`].
    #[must_use]
    pub fn observer(self, observer: impl FailureObserver + 'static) -> Self {
        self.shared_observer(Arc::new(observer))
    }

    /// Like [`observer`](Self::observer), keeping a handle for the caller.
    #[must_use]
    pub fn shared_observer(mut self, observer: Arc<dyn FailureObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Register a named function for `function` rules and transforms.
    #[must_use]
    pub fn function<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<Option<Value>, RuleError> + Send + Sync + 'static,
    {
        self.registry.register(name, f);
        self
    }

    /// Register a named function together with the data keys it reads.
    #[must_use]
    pub fn function_reading<F>(mut self, name: &str, reads: &[&str], f: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<Option<Value>, RuleError> + Send + Sync + 'static,
    {
        self.registry.register_reading(name, reads, f);
        self
    }

    /// Replace the function registry.
    #[must_use]
    pub fn registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            config: self.config,
            registry: self.registry,
            observer: self
                .observer
                .unwrap_or_else(|| Arc::new(TracingObserver)),
        }
    }
}
