//! Record lookups over sequences of mappings

use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::{deep_get_key, has, own_value};
use crate::val::{is_truthy, to_text};

/// How [`find_one`] compares string values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Match when the record's value contains the search value
    pub substring: bool,
    /// Lowercase both sides before comparing
    pub case_insensitive: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            substring: false,
            case_insensitive: true,
        }
    }
}

impl MatchOptions {
    pub fn substring(mut self, enabled: bool) -> Self {
        self.substring = enabled;
        self
    }

    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    fn matches(self, candidate: Option<&Value>, wanted: &Value) -> bool {
        match (candidate, wanted) {
            (Some(Value::String(have)), Value::String(want)) => {
                let (have, want) = if self.case_insensitive {
                    (have.to_lowercase(), want.to_lowercase())
                } else {
                    (have.clone(), want.clone())
                };
                if self.substring {
                    have.contains(&want)
                } else {
                    have == want
                }
            }
            (Some(have), want) => have == want,
            (None, _) => false,
        }
    }
}

/// Pick `return_key` out of `record` when it is set and present
fn project<'a>(record: &'a Value, return_key: &str) -> &'a Value {
    if return_key.is_empty() {
        return record;
    }
    own_value(record, return_key).unwrap_or(record)
}

/// First record whose `match_key` value matches `match_value`
///
/// Returns the record's `return_key` value when that key is present,
/// otherwise the whole record.
///
/// # Example
///
/// ```rust
/// use nestkit::deep::{find_one, MatchOptions};
/// use serde_json::json;
///
/// let users = vec![json!({"id": 1, "name": "Ada"}), json!({"id": 2, "name": "Grace"})];
/// let id = find_one(&users, "name", &json!("grace"), "id", MatchOptions::default());
/// assert_eq!(id, Some(&json!(2)));
/// ```
pub fn find_one<'a>(
    data: &'a [Value],
    match_key: &str,
    match_value: &Value,
    return_key: &str,
    options: MatchOptions,
) -> Option<&'a Value> {
    data.iter()
        .find(|record| options.matches(own_value(record, match_key), match_value))
        .map(|record| project(record, return_key))
}

/// Every record whose `match_key` value equals `match_value` exactly,
/// projected to `return_key` when present
pub fn find_all<'a>(data: &'a [Value], match_key: &str, match_value: &Value, return_key: &str) -> Vec<&'a Value> {
    data.iter()
        .filter(|record| own_value(record, match_key) == Some(match_value))
        .map(|record| project(record, return_key))
        .collect()
}

/// The value under `key` in each record, `null` where it is missing
///
/// Only the record's own key is read; positions line up with `data`.
pub fn extract_key(data: &[Value], key: &str) -> Vec<Value> {
    data.iter()
        .map(|record| own_value(record, key).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Deep-search each mapping for `key`, collecting the truthy hits
pub fn extract_key_array(data: &[Value], key: &str) -> Vec<Value> {
    data.iter()
        .filter(|record| record.is_object())
        .filter_map(|record| deep_get_key(record, key))
        .filter(|found| is_truthy(found))
        .cloned()
        .collect()
}

/// Build a record of `keys` from each mapping, deep-searching for every key
///
/// Records where any key is missing, falsy or the literal `''` are skipped.
pub fn extract_keys(data: &[Value], keys: &[&str]) -> Vec<Value> {
    data.iter()
        .filter(|record| record.is_object())
        .filter_map(|record| {
            let mut picked = Map::new();
            for key in keys {
                let found = deep_get_key(record, key)
                    .filter(|v| is_truthy(v) && v.as_str() != Some("''"))?;
                picked.insert((*key).to_string(), found.clone());
            }
            Some(Value::Object(picked))
        })
        .collect()
}

/// Whether `input` is truthy and [`has`] every key
pub fn validate_object(input: &Value, keys: &[&str]) -> bool {
    is_truthy(input) && keys.iter().all(|key| has(input, key))
}

/// Keep the mappings that pass [`validate_object`]; a single mapping is
/// treated as a one-element sequence
pub fn validate_object_array(input: &Value, keys: &[&str]) -> Vec<Value> {
    match input {
        Value::Object(_) => {
            if validate_object(input, keys) {
                vec![input.clone()]
            } else {
                Vec::new()
            }
        }
        Value::Array(items) => items
            .iter()
            .filter(|item| validate_object(item, keys))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Copy a mapping with its keys in alphabetical order
pub fn sort_object(input: &Value) -> Value {
    match input {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            )
        }
        other => other.clone(),
    }
}

/// Direction for [`key_sort_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Copy `data` sorted by the value under `key`
///
/// Values compare as loose text in natural order, so `"item2"` sorts before
/// `"item10"` and letters ignore case. Records whose value is `null` or
/// missing go last in either direction. The sort is stable.
///
/// # Example
///
/// ```rust
/// use nestkit::deep::{key_sort_data, SortOrder};
/// use serde_json::json;
///
/// let rows = vec![json!({"n": "v10"}), json!({"n": null}), json!({"n": "v9"})];
/// let sorted = key_sort_data(&rows, "n", SortOrder::Ascending);
/// assert_eq!(sorted, vec![json!({"n": "v9"}), json!({"n": "v10"}), json!({"n": null})]);
/// ```
pub fn key_sort_data(data: &[Value], key: &str, order: SortOrder) -> Vec<Value> {
    let mut sorted = data.to_vec();
    if key.is_empty() {
        return sorted;
    }

    sorted.sort_by(|a, b| {
        let left = own_value(a, key).filter(|v| !v.is_null());
        let right = own_value(b, key).filter(|v| !v.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(l), Some(r)) => {
                let ordering = natural_cmp(&to_text(l), &to_text(r));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            }
        }
    });
    sorted
}

/// Sort records in place by the numeric value under `key`, smallest first
///
/// Numeric strings count as numbers; records without a numeric value keep
/// their relative order after the numeric ones.
pub fn sort_obj_array(data: &mut [Value], key: &str) {
    let number_at = |record: &Value| {
        own_value(record, key).and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
    };
    data.sort_by(|a, b| match (number_at(a), number_at(b)) {
        (Some(l), Some(r)) => l.total_cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Compare text with digit runs taken as numbers, letters case-insensitively
fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut l = left.chars().peekable();
    let mut r = right.chars().peekable();
    loop {
        match (l.peek().copied(), r.peek().copied()) {
            (None, None) => return left.cmp(right),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                let da = take_digits(&mut l);
                let db = take_digits(&mut r);
                let ordering = da.len().cmp(&db.len()).then_with(|| da.cmp(&db));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(a), Some(b)) => {
                let ordering = a.to_lowercase().cmp(b.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                l.next();
                r.next();
            }
        }
    }
}

/// Consume a run of digits, dropping leading zeros
fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        if !(digits.is_empty() && c == '0') {
            digits.push(c);
        }
    }
    digits
}

/// Wrap each element as a one-field record `{key: text}`
pub fn array_to_obj_array(input: &[Value], key: &str) -> Vec<Value> {
    input
        .iter()
        .map(|element| {
            let mut record = Map::new();
            record.insert(key.to_string(), Value::String(to_text(element)));
            Value::Object(record)
        })
        .collect()
}

/// First record whose own `key` equals `value` exactly
pub fn object_find_by_key<'a>(input: &'a [Value], key: &str, value: &Value) -> Option<&'a Value> {
    input.iter().find(|record| own_value(record, key) == Some(value))
}

/// Values of a mapping (or elements of a sequence) as a flat list
pub fn obj_vals_to_array(input: &Value) -> Vec<Value> {
    match input {
        Value::Object(map) => map.values().cloned().collect(),
        Value::Array(items) => items.clone(),
        _ => Vec::new(),
    }
}
