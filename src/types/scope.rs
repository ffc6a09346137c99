use super::{EvaluationContext, Value};

/// The bindings visible to a rule body.
///
/// Conditions and computed properties see `data`, `parentData` and
/// `rootData`. Filter transforms see `value` (the resolved source field) and
/// `data`. Any other identifier is unbound.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    kind: ScopeKind<'a>,
}

#[derive(Debug, Clone, Copy)]
enum ScopeKind<'a> {
    Context {
        data: &'a Value,
        parent_data: Option<&'a Value>,
        root_data: &'a Value,
    },
    Transform {
        value: Option<&'a Value>,
        data: &'a Value,
    },
}

impl<'a> Scope<'a> {
    #[must_use]
    pub fn for_context(ctx: &'a EvaluationContext) -> Self {
        Self {
            kind: ScopeKind::Context {
                data: ctx.data(),
                parent_data: ctx.parent_data(),
                root_data: ctx.root_data(),
            },
        }
    }

    #[must_use]
    pub fn for_transform(value: Option<&'a Value>, data: &'a Value) -> Self {
        Self {
            kind: ScopeKind::Transform { value, data },
        }
    }

    /// Resolve a binding by name.
    ///
    /// The outer `Option` is `None` when the name is not bound at all; the
    /// inner one is `None` when it is bound to an absent value.
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<Option<&'a Value>> {
        match (self.kind, name) {
            (ScopeKind::Context { data, .. } | ScopeKind::Transform { data, .. }, "data") => {
                Some(Some(data))
            }
            (ScopeKind::Context { parent_data, .. }, "parentData") => Some(parent_data),
            (ScopeKind::Context { root_data, .. }, "rootData") => Some(Some(root_data)),
            (ScopeKind::Transform { value, .. }, "value") => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn data(&self) -> &'a Value {
        match self.kind {
            ScopeKind::Context { data, .. } | ScopeKind::Transform { data, .. } => data,
        }
    }

    #[must_use]
    pub fn parent_data(&self) -> Option<&'a Value> {
        match self.kind {
            ScopeKind::Context { parent_data, .. } => parent_data,
            ScopeKind::Transform { .. } => None,
        }
    }

    #[must_use]
    pub fn root_data(&self) -> &'a Value {
        match self.kind {
            ScopeKind::Context { root_data, .. } => root_data,
            ScopeKind::Transform { data, .. } => data,
        }
    }

    /// The filter source value; always `None` outside a transform.
    #[must_use]
    pub fn value(&self) -> Option<&'a Value> {
        match self.kind {
            ScopeKind::Transform { value, .. } => value,
            ScopeKind::Context { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_bindings() {
        let ctx = EvaluationContext::new().set("x", 1_i64);
        let scope = Scope::for_context(&ctx);
        assert_eq!(scope.binding("data"), Some(Some(ctx.data())));
        assert_eq!(scope.binding("parentData"), Some(None));
        assert_eq!(scope.binding("rootData"), Some(Some(ctx.data())));
        assert_eq!(scope.binding("value"), None);
        assert_eq!(scope.binding("window"), None);
    }

    #[test]
    fn transform_bindings() {
        let data = Value::object();
        let v = Value::from("US");
        let scope = Scope::for_transform(Some(&v), &data);
        assert_eq!(scope.binding("value"), Some(Some(&v)));
        assert_eq!(scope.binding("data"), Some(Some(&data)));
        assert_eq!(scope.binding("rootData"), None);
        assert_eq!(scope.value(), Some(&v));
    }
}
