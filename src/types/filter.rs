use serde::{Deserialize, Serialize};

/// Maps one field's current value onto a query parameter of a cascading list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDependency {
    pub source_field: String,
    pub target_param: String,
    /// Optional rule rewriting the source value; sees `value` and `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

/// `filterBy` accepts a single dependency or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterBy {
    One(FilterDependency),
    Many(Vec<FilterDependency>),
}

impl FilterDependency {
    #[must_use]
    pub fn new(source_field: &str, target_param: &str) -> Self {
        Self {
            source_field: source_field.to_owned(),
            target_param: target_param.to_owned(),
            transform: None,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: &str) -> Self {
        self.transform = Some(transform.to_owned());
        self
    }
}

impl FilterBy {
    /// The dependencies in application order.
    #[must_use]
    pub fn entries(&self) -> &[FilterDependency] {
        match self {
            FilterBy::One(dependency) => std::slice::from_ref(dependency),
            FilterBy::Many(dependencies) => dependencies,
        }
    }
}

impl From<FilterDependency> for FilterBy {
    fn from(dependency: FilterDependency) -> Self {
        FilterBy::One(dependency)
    }
}

impl From<Vec<FilterDependency>> for FilterBy {
    fn from(dependencies: Vec<FilterDependency>) -> Self {
        FilterBy::Many(dependencies)
    }
}
