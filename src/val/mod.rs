//! Validity predicates and loose text conversion
//!
//! These helpers encode the truthiness rules the toolkit's fail-soft
//! behaviour is defined in terms of.

use serde_json::Value;

/// Placeholder written over invalid values by sanitizing and flattening
pub const PLACEHOLDER: &str = "-";

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy; every
/// sequence and mapping is truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `null`, `""` and `" "` count as invalid
pub fn is_invalid(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty() || s == " ",
        _ => false,
    }
}

/// Return `replace` when `value` is invalid, otherwise a copy of `value`
pub fn replace_if_invalid(value: &Value, replace: &Value) -> Value {
    if is_invalid(value) {
        replace.clone()
    } else {
        value.clone()
    }
}

/// Check that a value is present and, with `check_empty`, non-empty
///
/// Empty here means `""`, `0`, `false`, an empty sequence or an empty mapping.
pub fn is_valid(value: Option<&Value>, check_empty: bool) -> bool {
    let Some(value) = value else {
        return false;
    };
    if value.is_null() {
        return false;
    }
    if !check_empty {
        return true;
    }

    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        scalar => is_truthy(scalar),
    }
}

/// A sequence with at least one element
pub fn is_valid_array(value: &Value) -> bool {
    matches!(value, Value::Array(items) if !items.is_empty())
}

/// A non-empty sequence holding at least one container or null
pub fn is_object_array(value: &Value) -> bool {
    match value {
        Value::Array(items) => items
            .iter()
            .any(|item| matches!(item, Value::Object(_) | Value::Array(_) | Value::Null)),
        _ => false,
    }
}

/// Loose text conversion of a value
///
/// Strings are taken verbatim, integral numbers print without a fraction,
/// sequences join their elements with `,` (nulls become empty), and mappings
/// collapse to `[object Object]`.
///
/// # Example
///
/// ```rust
/// use nestkit::val::to_text;
/// use serde_json::json;
///
/// assert_eq!(to_text(&json!("Alice")), "Alice");
/// assert_eq!(to_text(&json!(["a", 1, null, true])), "a,1,,true");
/// assert_eq!(to_text(&json!(2.0)), "2");
/// ```
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| if item.is_null() { String::new() } else { to_text(item) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
