//! Path-addressed access to configuration trees.
//!
//! A configuration tree is a plain [`serde_json::Value`]. These helpers read,
//! insert and delete nodes by [`KeyPath`], creating intermediate containers
//! the way property-path setters do: an index segment creates an array and a
//! key segment creates an object.

use serde_json::{Map, Value};
use tracing::warn;

use crate::path::{KeyPath, Segment};
use crate::schema::MAX_SPARSE_INDEX;

/// A nested configuration tree.
pub type ConfigTree = Value;

/// Resolve `segment` against a single container.
#[must_use]
pub fn child<'a>(node: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment.as_key().as_ref()),
        Value::Array(items) => segment.as_index().and_then(|idx| items.get(idx)),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment.as_key().as_ref()),
        Value::Array(items) => segment.as_index().and_then(|idx| items.get_mut(idx)),
        _ => None,
    }
}

/// Resolve `path` inside `tree`. The root path resolves to the tree itself.
///
/// # Examples
///
/// ```
/// use layered_config::{tree, KeyPath};
/// use serde_json::json;
///
/// let config = json!({"servers": [{"port": 80}]});
/// assert_eq!(tree::get(&config, &KeyPath::parse("servers[0].port")), Some(&json!(80)));
/// assert_eq!(tree::get(&config, &KeyPath::parse("servers.1")), None);
/// ```
#[must_use]
pub fn get<'a>(tree: &'a Value, path: &KeyPath) -> Option<&'a Value> {
    path.iter().try_fold(tree, |node, segment| child(node, segment))
}

/// Mutable counterpart of [`get`].
#[must_use]
pub fn get_mut<'a>(tree: &'a mut Value, path: &KeyPath) -> Option<&'a mut Value> {
    path.iter()
        .try_fold(tree, |node, segment| child_mut(node, segment))
}

/// An empty container suited to hold children addressed by `segment`.
fn container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Index(_) => Value::Array(Vec::new()),
        Segment::Key(_) => Value::Object(Map::new()),
    }
}

/// Return the slot for `segment` inside `node`, creating it as `null` when
/// missing. Non-container nodes are replaced by a container suited to
/// `segment` first.
fn slot<'a>(node: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    let fits = match (&*node, segment) {
        (Value::Object(_), _) => true,
        (Value::Array(_), seg) => seg.as_index().is_some(),
        _ => false,
    };
    if !fits {
        *node = container_for(segment);
    }
    match node {
        Value::Array(items) => {
            let idx = segment.as_index()?;
            let len = idx.checked_add(1)?;
            if items.len() < len {
                items.resize(len, Value::Null);
            }
            items.get_mut(idx)
        }
        Value::Object(map) => Some(
            map.entry(segment.as_key().into_owned())
                .or_insert(Value::Null),
        ),
        _ => None,
    }
}

/// Whether [`set`] can write at `path` without growing an array past
/// [`MAX_SPARSE_INDEX`].
///
/// ```
/// use layered_config::{tree, KeyPath};
/// use serde_json::json;
///
/// let config = json!({"list": [1], "map": {}});
/// assert!(tree::within_bounds(&config, &KeyPath::parse("list[65535]")));
/// assert!(!tree::within_bounds(&config, &KeyPath::parse("list[65536]")));
/// assert!(tree::within_bounds(&config, &KeyPath::parse("map.4000000000")));
/// ```
#[must_use]
pub fn within_bounds(tree: &Value, path: &KeyPath) -> bool {
    let mut node = Some(tree);
    for segment in path {
        let indexes_array = match node {
            Some(Value::Object(_)) => false,
            Some(Value::Array(_)) => segment.as_index().is_some(),
            _ => matches!(segment, Segment::Index(_)),
        };
        if indexes_array && segment.as_index().is_some_and(|idx| idx > MAX_SPARSE_INDEX) {
            return false;
        }
        node = node.and_then(|current| child(current, segment));
    }
    true
}

/// Insert `value` at `path`, creating or replacing intermediate containers.
///
/// Setting the root path replaces the whole tree. A path that would grow an
/// array past [`MAX_SPARSE_INDEX`] is ignored with a warning and leaves the
/// tree untouched.
///
/// # Examples
///
/// ```
/// use layered_config::{tree, KeyPath};
/// use serde_json::json;
///
/// let mut config = json!({});
/// tree::set(&mut config, &KeyPath::parse("a.list[1]"), json!(true));
/// assert_eq!(config, json!({"a": {"list": [null, true]}}));
/// ```
pub fn set(tree: &mut Value, path: &KeyPath, value: Value) {
    if !within_bounds(tree, path) {
        warn!(path = %path, "ignoring write past array index {MAX_SPARSE_INDEX}");
        return;
    }
    let mut node = tree;
    for segment in path {
        let Some(next) = slot(node, segment) else {
            return;
        };
        node = next;
    }
    *node = value;
}

/// Delete the node at `path`, returning it.
///
/// Object members are removed. The last element of an array is popped;
/// other array positions are left as `null` holes so later indices keep
/// their positions. The root path is never removed.
pub fn unset(tree: &mut Value, path: &KeyPath) -> Option<Value> {
    let last = path.last()?;
    let parent = get_mut(tree, &path.parent())?;
    match parent {
        Value::Object(map) => map.remove(last.as_key().as_ref()),
        Value::Array(items) => {
            let idx = last.as_index()?;
            if items.len().checked_sub(1) == Some(idx) {
                items.pop()
            } else {
                items.get_mut(idx).map(Value::take)
            }
        }
        _ => None,
    }
}

/// Whether `value` can hold children.
#[must_use]
pub const fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Children of a container paired with the segment addressing each.
pub fn children(value: &Value) -> Box<dyn Iterator<Item = (Segment, &Value)> + '_> {
    match value {
        Value::Object(map) => Box::new(
            map.iter()
                .map(|(key, child)| (Segment::Key(key.clone()), child)),
        ),
        Value::Array(items) => Box::new(
            items
                .iter()
                .enumerate()
                .map(|(idx, child)| (Segment::Index(idx), child)),
        ),
        _ => Box::new(std::iter::empty()),
    }
}
