//! Object-to-array coercion.

use serde_json::{Map, Value};
use tracing::warn;

/// Largest index honoured when densifying an index-keyed object.
pub const MAX_SPARSE_INDEX: usize = 65_535;

/// Coerce `value` into an array.
///
/// - Objects: each key made only of decimal digits is placed at that index.
///   Other keys are dropped and gaps become `null`.
/// - Arrays are returned unchanged.
/// - Strings become an array of one-character strings.
/// - Other scalars become an empty array.
///
/// # Examples
///
/// ```
/// use layered_config::schema::to_array;
/// use serde_json::json;
///
/// let coerced = to_array(json!({"foo": "bar", "0": "a", "1": "b", "2": 78, "3": true}));
/// assert_eq!(coerced, json!(["a", "b", 78, true]));
/// assert_eq!(to_array(json!({"2": "c"})), json!([null, null, "c"]));
/// ```
#[must_use]
pub fn to_array(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Array(densify(map)),
        Value::Array(items) => Value::Array(items),
        Value::String(text) => Value::Array(
            text.chars()
                .map(|ch| Value::String(ch.to_string()))
                .collect(),
        ),
        Value::Null | Value::Bool(_) | Value::Number(_) => Value::Array(Vec::new()),
    }
}

fn densify(map: Map<String, Value>) -> Vec<Value> {
    let mut indexed: Vec<(usize, Value)> = Vec::with_capacity(map.len());
    for (key, value) in map {
        let Some(idx) = index_of(&key) else {
            continue;
        };
        if idx > MAX_SPARSE_INDEX {
            warn!(key = %key, "dropping array index above {MAX_SPARSE_INDEX}");
            continue;
        }
        indexed.push((idx, value));
    }

    let len = indexed.iter().map(|(idx, _)| idx + 1).max().unwrap_or(0);
    let mut items = vec![Value::Null; len];
    for (idx, value) in indexed {
        if let Some(slot) = items.get_mut(idx) {
            *slot = value;
        }
    }
    items
}

fn index_of(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}
