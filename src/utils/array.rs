//! Sequence helpers
//!
//! Small flat-sequence utilities used alongside the deep toolkit. Generic
//! helpers work on any `PartialEq` element; the `Value` helpers apply the
//! toolkit's truthiness rules.

use serde_json::Value;

use crate::val::is_truthy;

/// Remove duplicates, keeping the first occurrence of each element
///
/// # Example
///
/// ```rust
/// use nestkit::utils::array::unique_array;
///
/// assert_eq!(unique_array(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
/// ```
pub fn unique_array<T: Clone + PartialEq>(input: &[T]) -> Vec<T> {
    let mut result: Vec<T> = Vec::with_capacity(input.len());
    for item in input {
        if !result.contains(item) {
            result.push(item.clone());
        }
    }
    result
}

/// Concatenate two sequences, optionally removing duplicates
pub fn merge_array<T: Clone + PartialEq>(first: &[T], second: &[T], remove_duplicates: bool) -> Vec<T> {
    let combined: Vec<T> = first.iter().chain(second).cloned().collect();
    if remove_duplicates {
        unique_array(&combined)
    } else {
        combined
    }
}

/// Whether `value` appears in `candidates`
pub fn is_one_of<T: PartialEq>(value: &T, candidates: &[T]) -> bool {
    candidates.contains(value)
}

/// Drop `null` and `""` entries; `0` and `false` are kept
pub fn remove_empty(input: &[Value]) -> Vec<Value> {
    input
        .iter()
        .filter(|item| !item.is_null() && item.as_str() != Some(""))
        .cloned()
        .collect()
}

/// Drop every falsy entry: `null`, `false`, `0` and `""`
pub fn clean_array(input: &[Value]) -> Vec<Value> {
    input.iter().filter(|item| is_truthy(item)).cloned().collect()
}

/// Split `text` on any of `separators`
///
/// Empty separators are ignored; with no usable separator the whole text is
/// returned as the only element.
///
/// # Example
///
/// ```rust
/// use nestkit::utils::array::parse_text_to_array;
///
/// assert_eq!(parse_text_to_array("a,b;c", &[",", ";"]), vec!["a", "b", "c"]);
/// assert_eq!(parse_text_to_array("a,b", &[]), vec!["a,b"]);
/// ```
pub fn parse_text_to_array(text: &str, separators: &[&str]) -> Vec<String> {
    let active: Vec<&str> = separators.iter().copied().filter(|s| !s.is_empty()).collect();
    if active.is_empty() {
        return vec![text.to_string()];
    }

    let mut parts = vec![text.to_string()];
    for separator in active {
        parts = parts
            .iter()
            .flat_map(|part| part.split(separator).map(str::to_string))
            .collect();
    }
    parts
}

/// Merge the fields of `extra` into every mapping of `input`
///
/// Fields already present are overwritten. Non-mapping elements are left
/// untouched.
pub fn splice(input: &mut [Value], extra: &Value) {
    let Some(fields) = extra.as_object() else {
        return;
    };
    for item in input.iter_mut() {
        if let Some(target) = item.as_object_mut() {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
