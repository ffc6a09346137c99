use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::Value;

/// Comparison applied by a `fieldValue` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Gt,
    Gte,
    Lt,
    Lte,
    Empty,
    #[default]
    NotEmpty,
    In,
    NotIn,
}

/// A gate rule (`disabled`, `enabled`, `visible`, `required`).
///
/// Serialized as a flat JSON object discriminated by `type`:
///
/// ```json
/// { "type": "fieldValue", "field": "status", "operator": "equals", "value": "A" }
/// { "type": "expression", "expression": "data.age >= 18", "default": false }
/// { "type": "function", "fnSource": "isAdult" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyCondition {
    #[serde(flatten)]
    pub kind: ConditionKind,
    /// Returned when the rule body fails.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConditionKind {
    FieldValue {
        field: String,
        #[serde(default)]
        operator: Operator,
        #[serde(
            default,
            deserialize_with = "present",
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<Value>,
    },
    Expression {
        expression: String,
    },
    Function {
        #[serde(rename = "fnSource")]
        fn_source: String,
    },
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)`; only a missing key
/// means "no value".
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl DependencyCondition {
    fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            default: None,
        }
    }

    /// A `fieldValue` condition comparing `field` against `value`.
    #[must_use]
    pub fn field_value(field: &str, operator: Operator, value: impl Into<Value>) -> Self {
        Self::new(ConditionKind::FieldValue {
            field: field.to_owned(),
            operator,
            value: Some(value.into()),
        })
    }

    /// A `fieldValue` condition with no comparison value (`empty`,
    /// `notEmpty`).
    #[must_use]
    pub fn field(field: &str, operator: Operator) -> Self {
        Self::new(ConditionKind::FieldValue {
            field: field.to_owned(),
            operator,
            value: None,
        })
    }

    #[must_use]
    pub fn expression(source: &str) -> Self {
        Self::new(ConditionKind::Expression {
            expression: source.to_owned(),
        })
    }

    #[must_use]
    pub fn function(source: &str) -> Self {
        Self::new(ConditionKind::Function {
            fn_source: source.to_owned(),
        })
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::Contains => "contains",
            Operator::NotContains => "notContains",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Empty => "empty",
            Operator::NotEmpty => "notEmpty",
            Operator::In => "in",
            Operator::NotIn => "notIn",
        })
    }
}
