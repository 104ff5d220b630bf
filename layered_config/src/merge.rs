//! Deep merge of configuration trees with leaf tracking.

use serde_json::{Map, Value};

use crate::path::{KeyPath, Segment};

/// Overlay every tree in `sources` onto `target`, in order.
///
/// `on_leaf` is invoked with the full path and value of every scalar the
/// sources write, before the write happens. Later sources win over earlier
/// ones and over values already present in `target`.
///
/// Behaviour:
/// - A container in a source forces a container of the same kind (object or
///   array) at that position in `target`, replacing whatever was there, and
///   merging continues inside it.
/// - Arrays merge by position; `target` arrays are padded with `null`.
/// - A scalar source at the top level contributes nothing.
///
/// # Examples
///
/// ```rust
/// use layered_config::{merge, KeyPath};
/// use serde_json::json;
///
/// let defaults = json!({"db": {"host": "localhost", "port": 5432}});
/// let overrides = json!({"db": {"port": 6432}});
///
/// let mut touched = Vec::new();
/// let mut merged = json!({});
/// merge::merge(&mut merged, [&defaults, &overrides], |path, _| touched.push(path.to_string()));
///
/// assert_eq!(merged, json!({"db": {"host": "localhost", "port": 6432}}));
/// assert_eq!(touched, ["db.host", "db.port", "db.port"]);
/// ```
pub fn merge<'s, I, F>(target: &mut Value, sources: I, mut on_leaf: F)
where
    I: IntoIterator<Item = &'s Value>,
    F: FnMut(&KeyPath, &Value),
{
    let mut path = KeyPath::root();
    for source in sources {
        merge_node(target, source, &mut path, &mut on_leaf);
    }
}

/// Overlay a single `source` onto `target`. See [`merge`].
pub fn merge_into<F>(target: &mut Value, source: &Value, mut on_leaf: F)
where
    F: FnMut(&KeyPath, &Value),
{
    merge_node(target, source, &mut KeyPath::root(), &mut on_leaf);
}

/// Merge without observing leaves.
pub fn merge_all<'s, I>(target: &mut Value, sources: I)
where
    I: IntoIterator<Item = &'s Value>,
{
    merge(target, sources, |_, _| {});
}

fn merge_node<F>(target: &mut Value, source: &Value, path: &mut KeyPath, on_leaf: &mut F)
where
    F: FnMut(&KeyPath, &Value),
{
    match source {
        Value::Object(map) => merge_object(target, map, path, on_leaf),
        Value::Array(items) => merge_array(target, items, path, on_leaf),
        _ => {}
    }
}

/// Merge `map` into `target`, converting a non-object target to `{}` first.
fn merge_object<F>(
    target: &mut Value,
    map: &Map<String, Value>,
    path: &mut KeyPath,
    on_leaf: &mut F,
) where
    F: FnMut(&KeyPath, &Value),
{
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Some(target_map) = target.as_object_mut() else {
        return;
    };

    for (key, value) in map {
        path.push(Segment::Key(key.clone()));
        let slot = target_map.entry(key.clone()).or_insert(Value::Null);
        merge_entry(slot, value, path, on_leaf);
        path.pop();
    }
}

/// Merge `items` into `target` by position, converting a non-array target to
/// `[]` first.
fn merge_array<F>(target: &mut Value, items: &[Value], path: &mut KeyPath, on_leaf: &mut F)
where
    F: FnMut(&KeyPath, &Value),
{
    if !target.is_array() {
        *target = Value::Array(Vec::new());
    }
    let Some(target_items) = target.as_array_mut() else {
        return;
    };
    if target_items.len() < items.len() {
        target_items.resize(items.len(), Value::Null);
    }

    for (slot, (idx, value)) in target_items.iter_mut().zip(items.iter().enumerate()) {
        path.push(Segment::Index(idx));
        merge_entry(slot, value, path, on_leaf);
        path.pop();
    }
}

fn merge_entry<F>(slot: &mut Value, value: &Value, path: &mut KeyPath, on_leaf: &mut F)
where
    F: FnMut(&KeyPath, &Value),
{
    match value {
        Value::Object(_) | Value::Array(_) => merge_node(slot, value, path, on_leaf),
        leaf => {
            on_leaf(path, leaf);
            slot.clone_from(leaf);
        }
    }
}
