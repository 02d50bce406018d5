//! Deep copies of JSON-like values
//!
//! Three interchangeable ways to copy a tree: recursive, iterative with an
//! explicit work stack (safe for very deep inputs), and a serialize/parse
//! round trip.

use serde_json::{Map, Value};

use crate::error::Result;

/// Recursively copy mappings and sequences; scalars are copied as-is
///
/// # Example
///
/// ```rust
/// use nestkit::deep::clone_obj;
/// use serde_json::json;
///
/// let original = json!({"a": 1, "b": {"c": [2, 3]}});
/// let mut copy = clone_obj(&original);
/// copy["b"]["c"][0] = json!(99);
///
/// assert_eq!(original["b"]["c"][0], 2);
/// ```
pub fn clone_obj(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(clone_obj).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), clone_obj(child)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Partially built container on the copy stack
enum Frame<'a> {
    Sequence {
        source: std::slice::Iter<'a, Value>,
        copied: Vec<Value>,
    },
    Mapping {
        source: serde_json::map::Iter<'a>,
        pending_key: Option<String>,
        copied: Map<String, Value>,
    },
}

impl<'a> Frame<'a> {
    fn open(value: &'a Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Frame::Sequence {
                source: items.iter(),
                copied: Vec::with_capacity(items.len()),
            }),
            Value::Object(map) => Some(Frame::Mapping {
                source: map.iter(),
                pending_key: None,
                copied: Map::new(),
            }),
            _ => None,
        }
    }

    /// Next source child, remembering its key for mappings
    fn next_child(&mut self) -> Option<&'a Value> {
        match self {
            Frame::Sequence { source, .. } => source.next(),
            Frame::Mapping { source, pending_key, .. } => source.next().map(|(key, child)| {
                *pending_key = Some(key.clone());
                child
            }),
        }
    }

    /// Store a finished copy of the child last returned by `next_child`
    fn push_copy(&mut self, child: Value) {
        match self {
            Frame::Sequence { copied, .. } => copied.push(child),
            Frame::Mapping { pending_key, copied, .. } => {
                if let Some(key) = pending_key.take() {
                    copied.insert(key, child);
                }
            }
        }
    }

    fn close(self) -> Value {
        match self {
            Frame::Sequence { copied, .. } => Value::Array(copied),
            Frame::Mapping { copied, .. } => Value::Object(copied),
        }
    }
}

/// Copy a value field by field without recursion
///
/// Produces the same result as [`clone_obj`].
pub fn deep_copy(input: &Value) -> Value {
    let Some(root) = Frame::open(input) else {
        return input.clone();
    };

    let mut stack = vec![root];
    loop {
        let next = match stack.last_mut() {
            Some(frame) => frame.next_child(),
            None => return Value::Null,
        };

        match next {
            Some(child) => match Frame::open(child) {
                Some(frame) => stack.push(frame),
                None => {
                    if let Some(frame) = stack.last_mut() {
                        frame.push_copy(child.clone());
                    }
                }
            },
            None => {
                let Some(finished) = stack.pop() else {
                    return Value::Null;
                };
                let copy = finished.close();
                match stack.last_mut() {
                    Some(parent) => parent.push_copy(copy),
                    None => return copy,
                }
            }
        }
    }
}

/// Copy a value by serializing it to JSON text and parsing it back
pub fn deep_copy_json(input: &Value) -> Result<Value> {
    let text = serde_json::to_string(input)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn nested() -> Value {
        json!({
            "name": "report",
            "sections": [
                {"title": "intro", "lines": ["a", "b"]},
                {"title": "body", "meta": {"pages": 3, "draft": false}}
            ],
            "empty_map": {},
            "empty_list": [],
            "nothing": null
        })
    }

    #[test]
    fn test_clone_obj_equal_and_independent() {
        let original = nested();
        let mut copy = clone_obj(&original);
        assert_eq!(copy, original);

        copy["sections"][0]["lines"][0] = json!("changed");
        assert_eq!(original["sections"][0]["lines"][0], "a");
    }

    #[test]
    fn test_deep_copy_matches_clone_obj() {
        let original = nested();
        assert_eq!(deep_copy(&original), clone_obj(&original));
        assert_eq!(deep_copy(&json!(5)), json!(5));
        assert_eq!(deep_copy(&json!([])), json!([]));
        assert_eq!(deep_copy(&json!([[[]]])), json!([[[]]]));
    }

    #[test]
    fn test_deep_copy_keeps_key_order() {
        let original = json!({"z": 1, "a": {"y": 2, "b": 3}});
        let keys: Vec<_> = deep_copy(&original)["a"]
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["y".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_deep_copy_handles_deep_nesting() {
        let mut value = json!("leaf");
        for _ in 0..2_000 {
            value = Value::Array(vec![value]);
        }
        let copy = deep_copy(&value);
        let mut cursor = &copy;
        let mut depth = 0;
        while let Some(inner) = cursor.get(0) {
            cursor = inner;
            depth += 1;
        }
        assert_eq!(depth, 2_000);
        assert_eq!(cursor, &json!("leaf"));
    }

    #[test]
    fn test_deep_copy_json() {
        let original = nested();
        assert_eq!(deep_copy_json(&original).unwrap(), original);
    }
}
