//! Reporting of rule failures.
//!
//! A failing rule never aborts evaluation; it falls back to its default and
//! the failure is handed to a [`FailureObserver`] so form authors can find
//! and fix it.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::RuleError;

/// Which rule of a component failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSlot {
    Disabled,
    Enabled,
    Visible,
    Required,
    Label,
    Placeholder,
    Value,
    Options,
    /// The transform of the filter entry at this position.
    FilterTransform(usize),
    /// A rule evaluated on its own, outside a component's rule bag.
    Standalone,
}

impl fmt::Display for RuleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSlot::Disabled => f.write_str("disabled"),
            RuleSlot::Enabled => f.write_str("enabled"),
            RuleSlot::Visible => f.write_str("visible"),
            RuleSlot::Required => f.write_str("required"),
            RuleSlot::Label => f.write_str("label"),
            RuleSlot::Placeholder => f.write_str("placeholder"),
            RuleSlot::Value => f.write_str("value"),
            RuleSlot::Options => f.write_str("options"),
            RuleSlot::FilterTransform(i) => write!(f, "filterBy[{i}].transform"),
            RuleSlot::Standalone => f.write_str("rule"),
        }
    }
}

/// One failed rule evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    component: Option<String>,
    slot: RuleSlot,
    error: RuleError,
}

impl RuleFailure {
    pub(crate) fn new(component: Option<&str>, slot: RuleSlot, error: RuleError) -> Self {
        Self {
            component: component.map(str::to_owned),
            slot,
            error,
        }
    }

    /// The component id, when the rule was evaluated as part of a form.
    #[must_use]
    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    #[must_use]
    pub fn slot(&self) -> RuleSlot {
        self.slot
    }

    #[must_use]
    pub fn error(&self) -> &RuleError {
        &self.error
    }
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(id) => write!(f, "{id}.{}: {}", self.slot, self.error),
            None => write!(f, "{}: {}", self.slot, self.error),
        }
    }
}

/// Side channel for rule failures.
pub trait FailureObserver: Send + Sync {
    fn rule_failed(&self, failure: &RuleFailure);
}

/// Logs each failure at `warn` level through `tracing`. The engine default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FailureObserver for TracingObserver {
    fn rule_failed(&self, failure: &RuleFailure) {
        tracing::warn!(
            component = failure.component().unwrap_or("-"),
            slot = %failure.slot(),
            error = %failure.error(),
            "rule evaluation failed; using default"
        );
    }
}

/// Keeps every failure in memory. Useful in tests and authoring tools.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    failures: Mutex<Vec<RuleFailure>>,
}

impl CollectingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the failures seen so far.
    #[must_use]
    pub fn failures(&self) -> Vec<RuleFailure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded failures.
    pub fn take(&self) -> Vec<RuleFailure> {
        std::mem::take(&mut *self.failures.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl FailureObserver for CollectingObserver {
    fn rule_failed(&self, failure: &RuleFailure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure.clone());
    }
}
