//! Structural comparison of two configuration snapshots.

use std::collections::HashSet;

use serde_json::Value;

use crate::path::KeyPath;
use crate::tree::{self, is_container};

/// A leaf that is new or holds a different value than before.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    /// Full path of the leaf.
    pub path: KeyPath,
    /// Value in the newer tree.
    pub value: Value,
}

/// Result of [`diff`]: leaves to write and subtrees to delete.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diff {
    /// Leaves whose value is new or differs.
    pub changed: Vec<Change>,
    /// Paths present before that no longer resolve.
    pub removed: Vec<KeyPath>,
}

impl Diff {
    /// Whether the two snapshots were structurally equal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }

    /// Keep one change per path (the last one written, at the position of
    /// the first) and one copy of each removal.
    pub fn dedup(&mut self) {
        let mut changes: Vec<Change> = Vec::with_capacity(self.changed.len());
        for change in self.changed.drain(..) {
            match changes.iter_mut().find(|c| c.path == change.path) {
                Some(existing) => existing.value = change.value,
                None => changes.push(change),
            }
        }
        self.changed = changes;

        let mut seen = HashSet::new();
        self.removed.retain(|path| seen.insert(path.clone()));
    }
}

/// Compare `old` with `new`.
///
/// Every leaf of `new` that is absent from `old` or holds a different value
/// becomes a [`Change`]; a new container is walked so each of its leaves is
/// reported individually. Every child of `old` that no longer resolves in
/// `new` becomes a single removal at that child's path. Arrays compare by
/// index.
///
/// Only leaves are reported. A value replaced by an empty object or array
/// has no leaves on either side of the comparison, so it yields no entry
/// at all and is never persisted.
///
/// # Examples
///
/// ```rust
/// use layered_config::{diff, KeyPath};
/// use serde_json::json;
///
/// let before = json!({"staffer": {"id": 97, "name": "lxndr"}, "legacy": {"a": 1}});
/// let after = json!({"staffer": {"id": 100, "name": "lxndr"}});
///
/// let d = diff::diff(&before, &after);
/// assert_eq!(d.changed.len(), 1);
/// assert_eq!(d.changed[0].path, KeyPath::parse("staffer.id"));
/// assert_eq!(d.changed[0].value, json!(100));
/// assert_eq!(d.removed, vec![KeyPath::parse("legacy")]);
/// ```
#[must_use]
pub fn diff(old: &Value, new: &Value) -> Diff {
    let mut out = Diff::default();
    let mut path = KeyPath::root();
    walk(Some(old), new, &mut path, &mut out);
    out
}

fn walk(old: Option<&Value>, new: &Value, path: &mut KeyPath, out: &mut Diff) {
    for (segment, new_child) in tree::children(new) {
        let old_child = old.and_then(|o| tree::child(o, &segment));
        path.push(segment);
        if is_container(new_child) {
            walk(old_child, new_child, path, out);
        } else if old_child != Some(new_child) {
            out.changed.push(Change {
                path: path.clone(),
                value: new_child.clone(),
            });
        }
        path.pop();
    }

    let Some(previous) = old.filter(|o| is_container(o)) else {
        return;
    };
    if !is_container(new) {
        return;
    }
    for (segment, _) in tree::children(previous) {
        if tree::child(new, &segment).is_none() {
            out.removed.push(path.child(segment));
        }
    }
}
