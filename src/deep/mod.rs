//! Deep structure toolkit
//!
//! Recursive operations over arbitrarily nested JSON-like values. Traversal is
//! pre-order: a node's own key is checked before its children are visited,
//! and children are visited in enumeration order (insertion order for
//! mappings, index order for sequences).
//!
//! A node's "own keys" are a mapping's keys or a sequence's index strings
//! (`"0"`, `"1"`, ...). Scalars own nothing.
//!
//! Every function here fails soft: a missing key, a null root or a shape
//! mismatch yields `None`, `false` or an empty collection, never a panic.
//! Only [`find_and_set_object`] and the functions in [`sanitize`] mutate
//! their input; they take `&mut Value` and say so in their names and docs.

use serde_json::Value;
use tracing::trace;

use crate::val::is_truthy;

pub mod clone;
pub mod filter;
pub mod flatten;
pub mod query;
pub mod sanitize;

pub use clone::{clone_obj, deep_copy, deep_copy_json};
pub use filter::{filter_data, filter_data_fast, filter_keys, remove_key, Filter};
pub use flatten::{flat_map_obj_text, flatten_obj, flatten_obj_array};
pub use query::{
    array_to_obj_array, extract_key, extract_key_array, extract_keys, find_all, find_one,
    key_sort_data, obj_vals_to_array, object_find_by_key, sort_obj_array, sort_object,
    validate_object, validate_object_array, MatchOptions, SortOrder,
};
pub use sanitize::{clean_json, sanitize_obj, sanitize_obj_array};

/// Value stored directly under `key` in `node`
pub(crate) fn own_value<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
        _ => None,
    }
}

/// Direct children of `node` in enumeration order
fn children(node: &Value) -> impl Iterator<Item = &Value> {
    let (map, items) = match node {
        Value::Object(map) => (Some(map), None),
        Value::Array(items) => (None, Some(items)),
        _ => (None, None),
    };
    map.into_iter()
        .flat_map(|map| map.values())
        .chain(items.into_iter().flatten())
}

/// Find the first value stored under `key` anywhere in `structure`
///
/// # Example
///
/// ```rust
/// use nestkit::deep::deep_get_key;
/// use serde_json::json;
///
/// let data = json!({"user": {"profile": {"name": "Ada"}}, "name": "root"});
/// assert_eq!(deep_get_key(&data, "name"), Some(&json!("root")));
/// assert_eq!(deep_get_key(&data, "missing"), None);
/// ```
pub fn deep_get_key<'a>(structure: &'a Value, key: &str) -> Option<&'a Value> {
    deep_search(structure, key, |_, _| true, false)
}

/// Find the first node owning `key` whose value satisfies `predicate`
///
/// Returns the matched value, or the enclosing container when
/// `return_parent` is set. Stops at the first match.
pub fn deep_search<'a, P>(
    structure: &'a Value,
    key: &str,
    predicate: P,
    return_parent: bool,
) -> Option<&'a Value>
where
    P: Fn(&str, &Value) -> bool,
{
    search_first(structure, key, &predicate, return_parent)
}

fn search_first<'a>(
    node: &'a Value,
    key: &str,
    predicate: &dyn Fn(&str, &Value) -> bool,
    return_parent: bool,
) -> Option<&'a Value> {
    if let Some(found) = own_value(node, key) {
        if predicate(key, found) {
            return Some(if return_parent { node } else { found });
        }
    }
    children(node).find_map(|child| search_first(child, key, predicate, return_parent))
}

/// Collect every container that owns `key` with a value satisfying
/// `predicate`, in discovery order
pub fn deep_search_items<'a, P>(structure: &'a Value, key: &str, predicate: P) -> Vec<&'a Value>
where
    P: Fn(&str, &Value) -> bool,
{
    let mut found = Vec::new();
    search_all(structure, key, &predicate, &mut found);
    found
}

fn search_all<'a>(
    node: &'a Value,
    key: &str,
    predicate: &dyn Fn(&str, &Value) -> bool,
    found: &mut Vec<&'a Value>,
) {
    if own_value(node, key).is_some_and(|value| predicate(key, value)) {
        found.push(node);
    }
    for child in children(node) {
        search_all(child, key, predicate, found);
    }
}

/// Overwrite `key` in the first mapping that owns it. Returns whether a
/// mapping was found.
fn set_first(node: &mut Value, key: &str, value: &Value) -> bool {
    match node {
        Value::Object(map) => {
            if let Some(slot) = map.get_mut(key) {
                *slot = value.clone();
                return true;
            }
            map.values_mut().any(|child| set_first(child, key, value))
        }
        Value::Array(items) => items.iter_mut().any(|child| set_first(child, key, value)),
        _ => false,
    }
}

/// Return a copy of `structure` with `key` replaced in the first mapping
/// (depth-first) that owns it
///
/// The input is left untouched. When no mapping owns `key` the copy equals
/// the input.
///
/// # Example
///
/// ```rust
/// use nestkit::deep::deep_find_set;
/// use serde_json::json;
///
/// let form = json!({"fields": [{"id": 1, "label": "Name"}]});
/// let updated = deep_find_set(&form, "label", json!("Full name"));
///
/// assert_eq!(updated["fields"][0]["label"], "Full name");
/// assert_eq!(form["fields"][0]["label"], "Name");
/// ```
pub fn deep_find_set(structure: &Value, key: &str, value: Value) -> Value {
    let mut updated = structure.clone();
    if !set_first(&mut updated, key, &value) {
        trace!("deep_find_set: no mapping owns key {:?}, structure unchanged", key);
    }
    updated
}

/// Overwrite `key` in the first mapping that owns it, in place
///
/// Mutates `structure` and returns the same reference.
pub fn find_and_set_object<'a>(structure: &'a mut Value, key: &str, value: Value) -> &'a mut Value {
    if !set_first(structure, key, &value) {
        trace!("find_and_set_object: no mapping owns key {:?}", key);
    }
    structure
}

/// Polymorphic presence check
///
/// - mapping: owns `key` (an empty `key` only asks "is this a mapping")
/// - sequence: non-empty and holds the string `key` as an element
/// - scalar: falsy scalars are `false`, others defer to [`val_contains`]
pub fn has(structure: &Value, key: &str) -> bool {
    match structure {
        Value::Object(map) => key.is_empty() || map.contains_key(key),
        Value::Array(items) => items.iter().any(|item| item.as_str() == Some(key)),
        scalar if is_truthy(scalar) => val_contains(scalar, &Value::String(key.to_string()), false),
        _ => false,
    }
}

/// True only when every key in `keys` is present
///
/// A mapping must own each key; a non-empty sequence requires every element
/// to be a mapping owning it. An empty `keys` list is `false`.
pub fn has_all(structure: &Value, keys: &[&str]) -> bool {
    !keys.is_empty() && keys.iter().all(|key| has_everywhere(structure, key))
}

fn has_everywhere(structure: &Value, key: &str) -> bool {
    match structure {
        Value::Object(map) => map.contains_key(key),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .all(|item| item.is_object() && has_everywhere(item, key)),
        _ => false,
    }
}

/// Check whether the JSON text of `value` contains the JSON text of `search`
///
/// Both operands are serialized, so strings keep their quotes:
/// `"hello world"` does not contain `"world"`, but `{"a":"world"}` does.
pub fn val_contains(value: &Value, search: &Value, case_sensitive: bool) -> bool {
    let haystack = value.to_string();
    let needle = search.to_string();
    if case_sensitive {
        haystack.contains(&needle)
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}
