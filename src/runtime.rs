use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::evaluate::evaluate;
use crate::observer::{FailureObserver, RuleFailure, RuleSlot};
use crate::types::rule::CompiledRule;
use crate::types::{RegisteredFunction, RuleError, Scope, Value};

/// Per-call execution settings shared by every evaluator.
#[derive(Clone, Copy)]
pub(crate) struct Runtime<'o> {
    pub(crate) max_steps: usize,
    pub(crate) observer: &'o dyn FailureObserver,
    pub(crate) component: Option<&'o str>,
}

impl<'o> Runtime<'o> {
    pub(crate) fn new(max_steps: usize, observer: &'o dyn FailureObserver) -> Self {
        Self {
            max_steps,
            observer,
            component: None,
        }
    }

    #[must_use]
    pub(crate) fn for_component(self, component: &'o str) -> Self {
        Self {
            component: Some(component),
            ..self
        }
    }

    /// Run a rule body. Errors are returned, not reported.
    pub(crate) fn run(
        &self,
        rule: &CompiledRule,
        scope: Scope<'_>,
    ) -> Result<Option<Value>, RuleError> {
        match rule {
            CompiledRule::Expr(expr) => evaluate(expr, scope, self.max_steps),
            CompiledRule::Function(f) => call(f, &scope),
            CompiledRule::Broken { error, .. } => Err(error.clone()),
        }
    }

    /// Run a rule body, reporting a failure and substituting `default`.
    pub(crate) fn run_or(
        &self,
        rule: &CompiledRule,
        scope: Scope<'_>,
        slot: RuleSlot,
        default: Option<&Value>,
    ) -> Option<Value> {
        match self.run(rule, scope) {
            Ok(value) => value,
            Err(error) => {
                self.report(slot, error);
                default.cloned()
            }
        }
    }

    pub(crate) fn report(&self, slot: RuleSlot, error: RuleError) {
        self.observer
            .rule_failed(&RuleFailure::new(self.component, slot, error));
    }
}

/// Call a host function. A panic inside it fails the rule like an error.
fn call(f: &RegisteredFunction, scope: &Scope<'_>) -> Result<Option<Value>, RuleError> {
    panic::catch_unwind(AssertUnwindSafe(|| (f.callable)(scope))).unwrap_or_else(|payload| {
        Err(RuleError::custom(format!(
            "function '{}' panicked: {}",
            f.name,
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown cause"
    }
}
