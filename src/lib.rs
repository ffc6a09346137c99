mod aggregate;
mod compile;
mod conditions;
mod config;
mod engine;
mod error;
mod evaluate;
mod extract;
mod filters;
mod form;
mod observer;
pub mod parse;
pub mod path;
mod properties;
mod runtime;
pub mod template;
mod types;

pub use config::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_SOURCE_LEN, DEFAULT_MAX_STEPS, EngineConfig};
pub use engine::{Engine, EngineBuilder};
pub use error::FormDepsError;
pub use extract::extract_dependent_fields;
pub use form::{CompiledForm, FormRules, should_reset};
pub use observer::{CollectingObserver, FailureObserver, RuleFailure, RuleSlot, TracingObserver};
pub use types::{
    BinaryOp, Builtin, CompiledDependencies, ComponentDependencies, ComputedProperty,
    ConditionKind, DependencyCondition, EffectiveState, EvaluationContext, Expr, FilterBy,
    FilterDependency, FunctionRegistry, Method, Operator, PropertyKind, RuleError, RuleFn, Scope,
    UnaryOp, Value,
};
