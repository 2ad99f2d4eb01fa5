//! Helpers for schema-free data trees

use serde_json::{Map, Value};

/// Merge `other` into `base`
///
/// Maps merge key-wise and recursively; any other value in `other`
/// overwrites what `base` holds at that position.
pub fn deep_merge(base: &mut Value, other: Value) {
    match (base, other) {
        (Value::Object(base), Value::Object(other)) => merge_maps(base, other),
        (base, other) => *base = other,
    }
}

fn merge_maps(base: &mut Map<String, Value>, other: Map<String, Value>) {
    for (key, value) in other {
        match base.get_mut(&key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

/// Merge two trees by value, `other` winning on conflicts
pub fn merged(base: &Value, other: &Value) -> Value {
    let mut result = base.clone();
    deep_merge(&mut result, other.clone());
    result
}

/// Look up a dotted path, yielding `None` for any missing segment
///
/// Numeric segments index into sequences.
pub fn get_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(data, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Check whether a value carries no information
///
/// `null`, empty strings, empty sequences and empty maps are empty;
/// `false` and `0` are not.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Recursively drop empty entries from maps and sequences
pub fn remove_empties(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, remove_empties(value)))
                .filter(|(_, value)| !is_empty(value))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(remove_empties)
                .filter(|value| !is_empty(value))
                .collect(),
        ),
        other => other,
    }
}
