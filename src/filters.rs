use std::collections::BTreeMap;

use crate::observer::RuleSlot;
use crate::path;
use crate::runtime::Runtime;
use crate::types::rule::CompiledFilter;
use crate::types::{Scope, Value};

/// Build the query parameters for a cascading list.
///
/// Entries whose source value is empty are left out entirely; an absent key
/// means "unconstrained". A failing transform keeps the raw source value. A
/// transform that yields undefined removes the parameter. Entries apply in
/// order, so a repeated `targetParam` is last-wins.
pub(crate) fn build_params(
    rt: &Runtime<'_>,
    filters: &[CompiledFilter],
    data: &Value,
) -> BTreeMap<String, Value> {
    let mut params = BTreeMap::new();
    for (i, filter) in filters.iter().enumerate() {
        let raw = path::get(data, &filter.source_field);
        let Some(raw) = raw.filter(|v| !path::is_empty(Some(*v))) else {
            continue;
        };

        let value = match &filter.transform {
            None => Some(raw.clone()),
            Some(transform) => match rt.run(transform, Scope::for_transform(Some(raw), data)) {
                Ok(transformed) => transformed,
                Err(error) => {
                    rt.report(RuleSlot::FilterTransform(i), error);
                    Some(raw.clone())
                }
            },
        };

        match value {
            Some(value) => {
                params.insert(filter.target_param.clone(), value);
            }
            None => {
                params.remove(&filter.target_param);
            }
        }
    }
    params
}
