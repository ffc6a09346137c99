use serde::{Deserialize, Serialize};

use super::{ComputedProperty, DependencyCondition, FilterBy};

/// The rule bag attached to one form component.
///
/// Every slot is optional; an absent slot leaves the component's static
/// definition in charge of that property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDependencies {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<DependencyCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<DependencyCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<DependencyCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<DependencyCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<ComputedProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<ComputedProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ComputedProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ComputedProperty>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<FilterBy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reset_on: Vec<String>,
}

impl ComponentDependencies {
    /// Parse a rule bag from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`FormDepsError::Json`](crate::FormDepsError::Json) if the input
    /// is not a valid rule bag.
    pub fn from_json(input: &str) -> Result<Self, crate::FormDepsError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Whether the bag holds no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FilterDependency, Operator};

    #[test]
    fn parse_full_bag() {
        let deps = ComponentDependencies::from_json(
            r#"{
                "visible": {"type": "fieldValue", "field": "kind", "operator": "equals", "value": "company"},
                "enabled": {"type": "expression", "expression": "data.age >= 18"},
                "label": {"type": "template", "template": "Hello {data.name}"},
                "filterBy": {"sourceField": "country", "targetParam": "country_id"},
                "resetOn": ["country"],
                "x-designer-note": "ignored"
            }"#,
        )
        .unwrap();

        assert_eq!(
            deps.visible,
            Some(DependencyCondition::field_value("kind", Operator::Equals, "company"))
        );
        assert!(deps.enabled.is_some());
        assert!(deps.disabled.is_none());
        assert_eq!(
            deps.filter_by,
            Some(FilterBy::One(FilterDependency::new("country", "country_id")))
        );
        assert_eq!(deps.reset_on, vec!["country".to_owned()]);
    }

    #[test]
    fn empty_bag() {
        let deps = ComponentDependencies::from_json("{}").unwrap();
        assert!(deps.is_empty());
        assert_eq!(serde_json::to_string(&deps).unwrap(), "{}");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let result = ComponentDependencies::from_json(r#"{"visible": 3}"#);
        assert!(matches!(result, Err(crate::FormDepsError::Json(_))));
    }
}
