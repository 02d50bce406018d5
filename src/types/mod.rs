//! Value kinds and type descriptors
//!
//! `serde_json::Value` already is the tagged union over
//! {Null, Bool, Number, String, Sequence, Mapping}; [`ValueKind`] gives that
//! union a fieldless mirror so callers can match on the shape without
//! borrowing the payload. The descriptor functions produce the human-facing
//! type names used when generating forms from data.

use serde_json::Value;
use std::fmt;

/// Shape of a JSON-like value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl ValueKind {
    /// Classify a value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Sequence,
            Value::Object(_) => ValueKind::Mapping,
        }
    }

    /// Whether values of this kind can hold nested values
    pub fn is_container(self) -> bool {
        matches!(self, ValueKind::Sequence | ValueKind::Mapping)
    }

    /// Whether values of this kind are leaves
    pub fn is_scalar(self) -> bool {
        !self.is_container()
    }

    /// Lowercase type name as reported by [`get_type`]
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Sequence => "array",
            ValueKind::Mapping => "object",
        }
    }
}

impl From<&Value> for ValueKind {
    fn from(value: &Value) -> Self {
        ValueKind::of(value)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describe the type of a possibly-absent value
///
/// Non-empty sequences are described by their first element in brackets,
/// e.g. `"[string]"` or `"[object]"`; empty sequences are `"array"`.
/// An absent value is `"undefined"`.
///
/// # Example
///
/// ```rust
/// use nestkit::types::get_type;
/// use serde_json::json;
///
/// assert_eq!(get_type(Some(&json!(["a", "b"]))), "[string]");
/// assert_eq!(get_type(Some(&json!({"a": 1}))), "object");
/// assert_eq!(get_type(None), "undefined");
/// ```
pub fn get_type(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return "undefined".to_string();
    };

    match value {
        Value::Array(items) => match items.first() {
            Some(first) => format!("[{}]", get_type(Some(first))),
            None => "array".to_string(),
        },
        other => ValueKind::of(other).name().to_string(),
    }
}

/// Describe the element type of a sequence
///
/// Returns `"[<type>]"` when every element shares one descriptor,
/// `"[mixed]"` otherwise, `"array"` for an empty sequence, and
/// `"Not an array."` for anything that is not a sequence.
pub fn get_array_type(value: &Value) -> String {
    let Value::Array(items) = value else {
        return "Not an array.".to_string();
    };

    let mut subtype: Option<String> = None;
    for element in items {
        let element_type = get_type(Some(element));
        let next = match subtype.as_deref() {
            None => Some(element_type),
            Some(current) if current != "mixed" && current != element_type => {
                Some("mixed".to_string())
            }
            _ => None,
        };
        if next.is_some() {
            subtype = next;
        }
    }

    match subtype {
        Some(subtype) => format!("[{subtype}]"),
        None => "array".to_string(),
    }
}

/// Form field type for a value
///
/// Mappings and sequences of containers are `"data"`, sequences of scalars
/// take their first element's field type, strings are `"text"`, booleans are
/// `"checkbox"`.
pub fn get_field_type(value: &Value) -> &'static str {
    match value {
        Value::Array(items) => match items.first() {
            Some(Value::Array(_) | Value::Object(_) | Value::Null) => "data",
            Some(scalar) => get_field_type(scalar),
            None => "array",
        },
        Value::Object(_) => "data",
        Value::String(_) => "text",
        Value::Number(_) => "number",
        Value::Bool(_) => "checkbox",
        Value::Null => "invalid",
    }
}
