use serde::{Deserialize, Serialize};

use super::Value;
use super::condition::present;

/// A dynamic `label`, `placeholder`, `value` or `options` rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedProperty {
    #[serde(flatten)]
    pub kind: PropertyKind,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PropertyKind {
    Template {
        template: String,
    },
    Expression {
        expression: String,
    },
    Function {
        #[serde(rename = "fnSource")]
        fn_source: String,
    },
}

impl ComputedProperty {
    fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            default: None,
        }
    }

    #[must_use]
    pub fn template(template: &str) -> Self {
        Self::new(PropertyKind::Template {
            template: template.to_owned(),
        })
    }

    #[must_use]
    pub fn expression(source: &str) -> Self {
        Self::new(PropertyKind::Expression {
            expression: source.to_owned(),
        })
    }

    #[must_use]
    pub fn function(source: &str) -> Self {
        Self::new(PropertyKind::Function {
            fn_source: source.to_owned(),
        })
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}
