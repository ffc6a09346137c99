use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{RuleError, Scope, Value};

/// Signature of a registered rule function.
pub type RuleFn = dyn Fn(&Scope<'_>) -> Result<Option<Value>, RuleError> + Send + Sync;

/// A host-provided function selected by name from a `function` rule's
/// `fnSource`.
#[derive(Clone)]
pub(crate) struct RegisteredFunction {
    pub(crate) name: String,
    /// Field keys the function reads, fed into dependency extraction. `None`
    /// when undeclared, which counts as reading all of `data`.
    pub(crate) reads: Option<Vec<String>>,
    pub(crate) callable: Arc<RuleFn>,
}

impl fmt::Debug for RegisteredFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredFunction")
            .field("name", &self.name)
            .field("reads", &self.reads)
            .finish_non_exhaustive()
    }
}

/// Named, pre-vetted callables that `function` rules and filter transforms can
/// reference instead of carrying script text.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, RegisteredFunction>,
}

impl FunctionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `name`, replacing any previous one.
    ///
    /// The function is opaque to dependency extraction, so components using
    /// it are re-evaluated on every change. Use
    /// [`register_reading`](Self::register_reading) to declare the fields it
    /// reads instead.
    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&Scope<'_>) -> Result<Option<Value>, RuleError> + Send + Sync + 'static,
    {
        self.insert(name, None, Arc::new(f));
    }

    /// Register a function together with the data field keys it reads.
    pub fn register_reading<F>(&mut self, name: &str, reads: &[&str], f: F)
    where
        F: Fn(&Scope<'_>) -> Result<Option<Value>, RuleError> + Send + Sync + 'static,
    {
        let reads = reads.iter().map(|&r| r.to_owned()).collect();
        self.insert(name, Some(reads), Arc::new(f));
    }

    fn insert(&mut self, name: &str, reads: Option<Vec<String>>, callable: Arc<RuleFn>) {
        self.functions.insert(
            name.to_owned(),
            RegisteredFunction {
                name: name.to_owned(),
                reads,
                callable,
            },
        );
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RegisteredFunction> {
        self.functions.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// The number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
