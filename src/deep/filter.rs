//! Filtering sequences of records by key/value terms
//!
//! Two variants share one filter list format. [`filter_data`] converts the
//! value under each key to loose text and matches per element for sequences;
//! [`filter_data_fast`] matches against the value's JSON text instead. They
//! disagree in documented ways: records lacking the key are kept by the
//! precise variant and dropped by the fast one, and the fast variant can
//! match key names and JSON punctuation inside nested values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::own_value;
use crate::val::{is_truthy, to_text};

/// One filtering term: keep records whose value at `key` contains `value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub value: String,
}

impl Filter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Filter {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Terms with an empty key or value are skipped
    fn is_active(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

/// Apply each active filter in turn, keeping only records that pass
///
/// A record passes a filter when any of these holds:
/// - the record itself is falsy (e.g. `null`)
/// - it has no value under the filter key
/// - the value under the key is falsy
/// - the value's text contains the filter value, case-insensitively.
///   Mappings use their values joined with `,`; sequences pass when any
///   element matches.
///
/// # Example
///
/// ```rust
/// use nestkit::deep::{filter_data, Filter};
/// use serde_json::json;
///
/// let rows = vec![json!({"name": "Alice"}), json!({"name": "Bob"}), json!({})];
/// let kept = filter_data(&rows, &[Filter::new("name", "ali")]);
/// assert_eq!(kept, vec![json!({"name": "Alice"}), json!({})]);
/// ```
pub fn filter_data(data: &[Value], filters: &[Filter]) -> Vec<Value> {
    apply_filters(data, filters, passes_precise)
}

/// Like [`filter_data`], but compares the lowercase JSON text of the value
/// under the key; records without the key are dropped
pub fn filter_data_fast(data: &[Value], filters: &[Filter]) -> Vec<Value> {
    apply_filters(data, filters, passes_fast)
}

fn apply_filters(data: &[Value], filters: &[Filter], passes: fn(&Value, &str, &str) -> bool) -> Vec<Value> {
    let mut retained: Vec<&Value> = data.iter().collect();
    for filter in filters.iter().filter(|f| f.is_active()) {
        let needle = filter.value.to_lowercase();
        retained.retain(|record| passes(record, &filter.key, &needle));
    }
    retained.into_iter().cloned().collect()
}

fn passes_precise(record: &Value, key: &str, needle: &str) -> bool {
    if !is_truthy(record) {
        return true;
    }
    let Some(found) = own_value(record, key) else {
        return true;
    };
    if !is_truthy(found) {
        return true;
    }

    match found {
        Value::Object(map) => map
            .values()
            .map(to_text)
            .collect::<Vec<_>>()
            .join(",")
            .to_lowercase()
            .contains(needle),
        Value::Array(items) => items
            .iter()
            .any(|item| to_text(item).to_lowercase().contains(needle)),
        scalar => to_text(scalar).to_lowercase().contains(needle),
    }
}

fn passes_fast(record: &Value, key: &str, needle: &str) -> bool {
    if !is_truthy(record) {
        return true;
    }
    own_value(record, key).is_some_and(|found| found.to_string().to_lowercase().contains(needle))
}

/// Copy a mapping without the listed keys; other values are returned as-is
pub fn filter_keys(input: &Value, keys: &[&str]) -> Value {
    match input {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !keys.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

/// Copy a mapping without `key`
pub fn remove_key(input: &Value, key: &str) -> Value {
    filter_keys(input, &[key])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn people() -> Vec<Value> {
        vec![
            json!({"name": "Alice", "city": "Oslo", "tags": ["admin", "ops"]}),
            json!({"name": "Bob", "city": "Bergen", "tags": ["dev"]}),
            json!({"name": "Carol", "address": {"city": "Oslo", "zip": 150}}),
        ]
    }

    #[test]
    fn test_filter_data_case_insensitive() {
        let rows = vec![json!({"name": "Alice"}), json!({"name": "Bob"})];
        let kept = filter_data(&rows, &[Filter::new("name", "ali")]);
        assert_eq!(kept, vec![json!({"name": "Alice"})]);
    }

    #[test]
    fn test_filter_data_missing_key_passes() {
        let rows = vec![json!({"x": 1}), json!({})];
        let kept = filter_data(&rows, &[Filter::new("x", "1")]);
        assert_eq!(kept, rows);
    }

    #[test]
    fn test_filter_data_falsy_values_pass() {
        let rows = vec![json!({"x": null}), json!({"x": 0}), json!({"x": ""}), json!(null), json!({"x": 5})];
        let kept = filter_data(&rows, &[Filter::new("x", "9")]);
        assert_eq!(kept, rows[..4].to_vec());
    }

    #[test]
    fn test_filter_data_sequences_and_mappings() {
        let kept = filter_data(&people(), &[Filter::new("tags", "OPS")]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0]["name"], "Alice");
        assert_eq!(kept[1]["name"], "Carol");

        let kept = filter_data(&people(), &[Filter::new("address", "150")]);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_filters_combine_and_skip_inactive() {
        let filters = [
            Filter::new("city", "E"),
            Filter::new("name", "o"),
            Filter::new("", "x"),
            Filter::new("name", ""),
        ];
        let kept = filter_data(&people(), &filters);
        let names: Vec<&Value> = kept.iter().map(|r| &r["name"]).collect();
        assert_eq!(names, vec!["Bob", "Carol"]);
    }

    #[test]
    fn test_no_filters_returns_everything() {
        assert_eq!(filter_data(&people(), &[]), people());
        assert_eq!(filter_data_fast(&people(), &[]), people());
    }

    #[test]
    fn test_fast_drops_records_without_key() {
        let rows = vec![json!({"x": 1}), json!({})];
        assert_eq!(filter_data_fast(&rows, &[Filter::new("x", "1")]), vec![json!({"x": 1})]);
    }

    #[test]
    fn test_fast_matches_json_text() {
        // key names inside nested values are part of the JSON text
        let rows = people();
        let fast = filter_data_fast(&rows, &[Filter::new("address", "city")]);
        assert_eq!(fast, vec![rows[2].clone()]);

        let precise = filter_data(&rows, &[Filter::new("address", "city")]);
        assert_eq!(precise, vec![rows[0].clone(), rows[1].clone()]);
    }

    #[test]
    fn test_scalar_sequences_diverge() {
        // precise matches element by element; fast sees the whole `["admin","ops"]` text
        let rows = vec![json!({"tags": ["admin", "ops"]})];
        let spanning = [Filter::new("tags", "n\",\"o")];
        assert!(filter_data(&rows, &spanning).is_empty());
        assert_eq!(filter_data_fast(&rows, &spanning), rows);

        let element = [Filter::new("tags", "OPS")];
        assert_eq!(filter_data(&rows, &element), rows);
        assert_eq!(filter_data_fast(&rows, &element), rows);
    }

    #[test]
    fn test_filter_keys_and_remove_key() {
        let row = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(filter_keys(&row, &["a", "c"]), json!({"b": 2}));
        assert_eq!(remove_key(&row, "b"), json!({"a": 1, "c": 3}));
        assert_eq!(remove_key(&row, "zzz"), row);
        assert_eq!(filter_keys(&json!([1]), &["0"]), json!([1]));
    }
}
