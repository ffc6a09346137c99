use super::Value;

/// The data snapshot a rule pass is evaluated against.
///
/// `data` is the component's own data scope, `parent_data` the enclosing
/// scope (e.g. the row of a sub-table) and `root_data` the whole form. When no
/// root is given, `data` doubles as the root. The engine only ever reads a
/// context; hosts build a fresh one for every mutation of the form data.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    data: Value,
    parent_data: Option<Value>,
    root_data: Option<Value>,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    /// Create a context with empty data.
    #[must_use]
    pub fn new() -> Self {
        Self::from_data(Value::object())
    }

    #[must_use]
    pub fn from_data(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            parent_data: None,
            root_data: None,
        }
    }

    /// Set a value at a dot-separated path in `data`. Creates intermediate
    /// objects as needed.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        crate::path::set(&mut self.data, path, value.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_data: impl Into<Value>) -> Self {
        self.parent_data = Some(parent_data.into());
        self
    }

    #[must_use]
    pub fn with_root(mut self, root_data: impl Into<Value>) -> Self {
        self.root_data = Some(root_data.into());
        self
    }

    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    #[must_use]
    pub fn parent_data(&self) -> Option<&Value> {
        self.parent_data.as_ref()
    }

    /// The root scope; falls back to `data` when none was set.
    #[must_use]
    pub fn root_data(&self) -> &Value {
        self.root_data.as_ref().unwrap_or(&self.data)
    }

    /// Look up a value in `data` by dot-separated path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        crate::path::get(&self.data, path)
    }
}

impl From<serde_json::Value> for EvaluationContext {
    fn from(data: serde_json::Value) -> Self {
        Self::from_data(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_nested() {
        let ctx = EvaluationContext::new().set("user.profile.age", 25_i64);
        assert_eq!(ctx.get("user.profile.age"), Some(&Value::from(25_i64)));
        assert_eq!(ctx.get("user.name"), None);
    }

    #[test]
    fn root_defaults_to_data() {
        let ctx = EvaluationContext::new().set("x", 1_i64);
        assert_eq!(ctx.root_data(), ctx.data());

        let ctx = ctx.with_root(serde_json::json!({"form": true}));
        assert_eq!(
            crate::path::get(ctx.root_data(), "form"),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn parent_is_optional() {
        let ctx = EvaluationContext::new();
        assert_eq!(ctx.parent_data(), None);
        let ctx = ctx.with_parent(serde_json::json!({"row": 2}));
        assert!(ctx.parent_data().is_some());
    }

    #[test]
    fn from_json() {
        let ctx = EvaluationContext::from(serde_json::json!({"status": "A"}));
        assert_eq!(ctx.get("status"), Some(&Value::from("A")));
    }
}
