use thiserror::Error;

/// Errors from loading rule documents and engine configuration.
///
/// Rule evaluation itself never fails; see [`RuleError`](crate::RuleError)
/// for how a broken rule is reported instead.
#[derive(Debug, Error)]
pub enum FormDepsError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
