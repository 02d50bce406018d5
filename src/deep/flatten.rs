//! Flattening nested mappings into single-level records

use serde_json::{Map, Value};

use crate::val::{to_text, PLACEHOLDER};

/// Flatten nested mappings into one level, joining key paths with `_`
///
/// Null and empty-string values become `"-"`. Sequences are kept whole
/// under their key. Anything other than a mapping flattens to an empty
/// mapping.
///
/// # Example
///
/// ```rust
/// use nestkit::deep::flatten_obj;
/// use serde_json::json;
///
/// let flat = flatten_obj(&json!({"a": {"b": 1, "c": {"d": 2}}, "e": null}));
/// assert_eq!(flat, json!({"a_b": 1, "a_c_d": 2, "e": "-"}));
/// ```
pub fn flatten_obj(input: &Value) -> Value {
    match input {
        Value::Object(map) => Value::Object(flatten_map(map)),
        _ => Value::Object(Map::new()),
    }
}

fn flatten_map(map: &Map<String, Value>) -> Map<String, Value> {
    let mut result = Map::new();
    for (key, value) in map {
        match value {
            Value::Object(nested) => {
                for (inner_key, inner) in flatten_map(nested) {
                    result.insert(format!("{key}_{inner_key}"), inner);
                }
            }
            Value::Null => {
                result.insert(key.clone(), Value::String(PLACEHOLDER.to_string()));
            }
            Value::String(s) if s.is_empty() => {
                result.insert(key.clone(), Value::String(PLACEHOLDER.to_string()));
            }
            other => {
                result.insert(key.clone(), other.clone());
            }
        }
    }
    result
}

/// Flatten every mapping in a sequence, recursing into nested sequences
/// position by position
pub fn flatten_obj_array(input: &[Value]) -> Vec<Value> {
    input
        .iter()
        .map(|element| match element {
            Value::Object(_) => flatten_obj(element),
            Value::Array(items) if !items.is_empty() => Value::Array(flatten_obj_array(items)),
            other => other.clone(),
        })
        .collect()
}

/// Render the leaves of a nested structure as `key: value` text with no
/// separators, e.g. `{"a": 1, "b": {"c": "x"}}` becomes `"a: 1c: x"`
pub fn flat_map_obj_text(input: &Value) -> String {
    let entries: Vec<(String, &Value)> = match input {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        _ => return String::new(),
    };

    entries
        .into_iter()
        .map(|(key, value)| match value {
            Value::Object(_) | Value::Array(_) => flat_map_obj_text(value),
            scalar => format!("{key}: {}", to_text(scalar)),
        })
        .collect()
}
