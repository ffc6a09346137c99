//! Dot-path lookup and replacement over nested form data.
//!
//! Paths like `"address.city"` or `"items.0.sku"` walk objects by key and
//! arrays by numeric index. A missing segment is never an error: lookups
//! simply report the value as absent.

use std::collections::BTreeMap;

use crate::Value;

/// Look up a value by dot-separated path.
///
/// Returns `None` as soon as a segment is missing or the value reached so far
/// cannot be indexed (a string, number, boolean or `null`).
#[must_use]
pub fn get<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(obj, |current, segment| child(current, segment))
}

/// One step of a path walk.
pub(crate) fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => array_index(key).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Whether a value counts as "not filled in": undefined, `null`, a
/// whitespace-only string or an empty array. `0`, `false` and `{}` are not
/// empty.
#[must_use]
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Write `value` at a dot-separated path, replacing whatever was there.
///
/// Intermediate objects are created as needed. An intermediate that is not an
/// object (or an array addressed by an in-range index) is overwritten with an
/// object.
pub fn set(target: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    set_recursive(target, &segments, value);
}

fn set_recursive(target: &mut Value, segments: &[&str], value: Value) {
    let [first, rest @ ..] = segments else {
        return;
    };

    if let Value::Array(items) = target
        && let Some(slot) = array_index(first).and_then(|i| items.get_mut(i))
    {
        if rest.is_empty() {
            *slot = value;
        } else {
            set_recursive(slot, rest, value);
        }
        return;
    }

    if !matches!(target, Value::Object(_)) {
        *target = Value::Object(BTreeMap::new());
    }
    if let Value::Object(map) = target {
        if rest.is_empty() {
            map.insert((*first).to_owned(), value);
        } else {
            let entry = map.entry((*first).to_owned()).or_insert(Value::Null);
            set_recursive(entry, rest, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::from(serde_json::json!({
            "name": "alice",
            "address": {"city": "Oslo", "zip": ""},
            "items": [{"sku": "A-1"}, {"sku": "B-2"}],
            "count": 0
        }))
    }

    #[test]
    fn get_simple_and_nested() {
        let data = sample();
        assert_eq!(get(&data, "name"), Some(&Value::from("alice")));
        assert_eq!(get(&data, "address.city"), Some(&Value::from("Oslo")));
        assert_eq!(get(&data, "items.1.sku"), Some(&Value::from("B-2")));
    }

    #[test]
    fn get_missing_returns_none() {
        let data = sample();
        assert_eq!(get(&data, "nonexistent"), None);
        assert_eq!(get(&data, "address.street"), None);
        assert_eq!(get(&data, "missing.deeply.nested"), None);
        assert_eq!(get(&data, "items.5.sku"), None);
        assert_eq!(get(&data, "items.+1"), None);
    }

    #[test]
    fn get_through_non_indexable_returns_none() {
        let data = sample();
        assert_eq!(get(&data, "name.length"), None);
        assert_eq!(get(&data, "count.value"), None);
    }

    #[test]
    fn emptiness() {
        assert!(is_empty(None));
        assert!(is_empty(Some(&Value::Null)));
        assert!(is_empty(Some(&Value::from("   "))));
        assert!(is_empty(Some(&Value::Array(vec![]))));
        assert!(!is_empty(Some(&Value::from(0_i64))));
        assert!(!is_empty(Some(&Value::Bool(false))));
        assert!(!is_empty(Some(&Value::object())));
        assert!(!is_empty(Some(&Value::from("x"))));
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut data = Value::object();
        set(&mut data, "user.profile.age", Value::from(25_i64));
        assert_eq!(get(&data, "user.profile.age"), Some(&Value::from(25_i64)));
    }

    #[test]
    fn set_overwrites_leaf_with_nested() {
        let mut data = Value::object();
        set(&mut data, "user", Value::from("old"));
        set(&mut data, "user.age", Value::from(30_i64));
        assert_eq!(get(&data, "user.age"), Some(&Value::from(30_i64)));
    }

    #[test]
    fn set_into_array_element() {
        let mut data = sample();
        set(&mut data, "items.0.sku", Value::from("Z-9"));
        assert_eq!(get(&data, "items.0.sku"), Some(&Value::from("Z-9")));
        assert_eq!(get(&data, "items.1.sku"), Some(&Value::from("B-2")));
    }
}
