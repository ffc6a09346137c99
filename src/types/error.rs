use thiserror::Error;

/// Why a rule body failed to produce a value.
///
/// These never escape the engine: the failing rule falls back to its
/// declared default and the error is handed to the
/// [`FailureObserver`](crate::FailureObserver).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("syntax error: {message}")]
    Syntax { message: String },

    #[error("rule source is {len} bytes, exceeding the limit of {limit}")]
    SourceTooLong { len: usize, limit: usize },

    #[error("'{name}' is not defined")]
    UnknownIdentifier { name: String },

    #[error("cannot read property '{property}' of {receiver}")]
    NullAccess {
        property: String,
        receiver: &'static str,
    },

    #[error("{receiver}.{method} is not a function")]
    NotCallable {
        method: &'static str,
        receiver: &'static str,
    },

    #[error("evaluation exceeded the budget of {limit} steps")]
    BudgetExceeded { limit: usize },

    #[error("{message}")]
    Custom { message: String },
}

impl RuleError {
    /// An error raised by a registered function.
    #[must_use]
    pub fn custom(message: impl Into<String>) -> Self {
        RuleError::Custom {
            message: message.into(),
        }
    }
}
