//! In-place sanitizing and blank templates
//!
//! `sanitize_*` mutate the value they are given and hand the same reference
//! back, so calls can be chained or ignored.

use serde_json::Value;

use crate::val::{is_invalid, is_truthy, PLACEHOLDER};

/// Replace invalid scalars (`null`, `""`, `" "`) in a mapping with `"-"`,
/// recursing into nested mappings and sequences
///
/// Mutates `input` and returns it. Non-mapping input is returned unchanged.
///
/// # Example
///
/// ```rust
/// use nestkit::deep::sanitize_obj;
/// use serde_json::json;
///
/// let mut row = json!({"name": "", "address": {"city": null}, "tags": [{"t": " "}]});
/// sanitize_obj(&mut row);
/// assert_eq!(row, json!({"name": "-", "address": {"city": "-"}, "tags": [{"t": "-"}]}));
/// ```
pub fn sanitize_obj(input: &mut Value) -> &mut Value {
    if let Value::Object(map) = &mut *input {
        for slot in map.values_mut() {
            if is_invalid(slot) {
                *slot = Value::String(PLACEHOLDER.to_string());
            } else if slot.is_object() {
                sanitize_obj(slot);
            } else if slot.is_array() {
                sanitize_obj_array(slot);
            }
        }
    }
    input
}

/// Sanitize every mapping inside a sequence, in place
///
/// Nested sequences are walked; scalar elements are left as they are.
pub fn sanitize_obj_array(input: &mut Value) -> &mut Value {
    if let Value::Array(items) = &mut *input {
        for item in items.iter_mut() {
            if item.is_object() {
                sanitize_obj(item);
            } else if item.is_array() {
                sanitize_obj_array(item);
            }
        }
    }
    input
}

/// Build a blank template with the same shape as `input`
///
/// Numbers become `0`, strings `""`, booleans `false`; sequences keep a
/// single templated element taken from their first entry.
///
/// # Example
///
/// ```rust
/// use nestkit::deep::clean_json;
/// use serde_json::json;
///
/// let template = clean_json(&json!({"id": 7, "tags": ["a", "b"], "meta": {"ok": true}}));
/// assert_eq!(template, json!({"id": 0, "tags": [""], "meta": {"ok": false}}));
/// ```
pub fn clean_json(input: &Value) -> Value {
    if !is_truthy(input) {
        return input.clone();
    }

    match input {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), clean_json(value)))
                .collect(),
        ),
        Value::Array(items) => match items.first() {
            Some(first) => Value::Array(vec![clean_json(first)]),
            None => Value::Array(Vec::new()),
        },
        Value::Number(_) => Value::from(0),
        Value::String(_) => Value::String(String::new()),
        Value::Bool(_) => Value::Bool(false),
        Value::Null => Value::Null,
    }
}
