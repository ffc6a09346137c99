mod condition;
mod context;
mod dependencies;
mod error;
pub(crate) mod expr;
mod filter;
mod function_registry;
mod property;
pub(crate) mod rule;
mod scope;
mod state;
pub(crate) mod value;

pub use condition::{ConditionKind, DependencyCondition, Operator};
pub use context::EvaluationContext;
pub use dependencies::ComponentDependencies;
pub use error::RuleError;
pub use expr::{BinaryOp, Builtin, Expr, Method, UnaryOp};
pub use filter::{FilterBy, FilterDependency};
pub(crate) use function_registry::RegisteredFunction;
pub use function_registry::{FunctionRegistry, RuleFn};
pub use property::{ComputedProperty, PropertyKind};
pub use rule::CompiledDependencies;
pub use scope::Scope;
pub use state::EffectiveState;
pub use value::Value;
