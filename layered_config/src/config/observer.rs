//! Change observers attached to tree paths.

use std::fmt;

use serde_json::Value;

use crate::path::KeyPath;
use crate::tree;

/// Handle returned by [`Config::subscribe`](crate::Config::subscribe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callback invoked with the observed path and its value after a write.
pub type Callback = Box<dyn FnMut(&KeyPath, Option<&Value>) + Send + Sync>;

struct Observer {
    id: SubscriptionId,
    path: KeyPath,
    callback: Callback,
}

#[derive(Default)]
pub(super) struct Observers {
    next: u64,
    list: Vec<Observer>,
}

impl Observers {
    pub(super) fn subscribe(&mut self, path: KeyPath, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.list.push(Observer { id, path, callback });
        id
    }

    pub(super) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.list.len();
        self.list.retain(|observer| observer.id != id);
        self.list.len() != before
    }

    /// Run every observer whose path overlaps one of `touched`, once each,
    /// in subscription order.
    pub(super) fn notify(&mut self, touched: &[KeyPath], tree: &Value) {
        if touched.is_empty() {
            return;
        }
        for observer in &mut self.list {
            if touched.iter().any(|path| path.overlaps(&observer.path)) {
                (observer.callback)(&observer.path, tree::get(tree, &observer.path));
            }
        }
    }

    pub(super) fn len(&self) -> usize {
        self.list.len()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.list.iter().map(|observer| observer.path.to_string()))
            .finish()
    }
}
