//! Provider over a Web-Storage-shaped key/value store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::Provider;
use crate::path::KeyPath;
use crate::{ConfigResult, ConfigResultExt, tree};

/// Flat string store addressed by rendered paths.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Every key currently stored.
    fn keys(&self) -> Vec<String>;

    /// Value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Storage`] when the store refuses the
    /// write.
    fn set_item(&self, key: &str, value: &str) -> ConfigResult<()>;

    /// Delete `key`. Missing keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Storage`] when the store refuses the
    /// deletion.
    fn remove_item(&self, key: &str) -> ConfigResult<()>;
}

/// In-process [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `items`.
    #[must_use]
    pub fn with_items<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: Mutex::new(
                items
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Copy of every stored pair.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.items.lock().clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn keys(&self) -> Vec<String> {
        self.items.lock().keys().cloned().collect()
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> ConfigResult<()> {
        self.items.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> ConfigResult<()> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// Writable provider mapping store keys to tree paths.
///
/// Each key is a rendered path such as `cpanel.staffer.id`; its value is
/// decoded as JSON where possible and kept as a plain string otherwise.
///
/// ```
/// use std::sync::Arc;
/// use layered_config::{MemoryStore, Provider, StorageProvider};
/// use serde_json::json;
///
/// let store = Arc::new(MemoryStore::with_items([("ui.theme", "dark"), ("ui.size", "12")]));
/// let provider = StorageProvider::new(store);
/// let tree = futures::executor::block_on(provider.load());
/// assert_eq!(tree.ok(), Some(json!({"ui": {"theme": "dark", "size": 12}})));
/// ```
#[derive(Debug)]
pub struct StorageProvider {
    store: Arc<dyn KeyValueStore>,
    base_path: KeyPath,
}

impl StorageProvider {
    /// Expose every key in `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            base_path: KeyPath::root(),
        }
    }

    /// Only expose keys below `base_path`, with that prefix stripped.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<KeyPath>) -> Self {
        self.base_path = base_path.into();
        self
    }

    fn key_for(&self, path: &KeyPath) -> String {
        self.base_path.join(path).to_string()
    }
}

/// JSON where possible, the raw text otherwise; empty text is `null`.
fn decode_item(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

#[async_trait]
impl Provider for StorageProvider {
    fn name(&self) -> &str {
        "localStorage"
    }

    async fn load(&self) -> ConfigResult<Value> {
        let mut out = Value::Object(Map::new());
        for key in self.store.keys() {
            let path = KeyPath::parse(&key);
            if !path.starts_with(&self.base_path) {
                continue;
            }
            let relative: KeyPath = path.iter().skip(self.base_path.len()).cloned().collect();
            if relative.is_empty() {
                continue;
            }
            if let Some(raw) = self.store.get_item(&key) {
                tree::set(&mut out, &relative, decode_item(&raw));
            }
        }
        Ok(out)
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn set(&self, path: &KeyPath, value: &Value) -> ConfigResult<()> {
        let encoded = match value {
            Value::String(text) => text.clone(),
            other => serde_json::to_string(other).into_config()?,
        };
        self.store.set_item(&self.key_for(path), &encoded)
    }

    async fn remove(&self, path: &KeyPath) -> ConfigResult<()> {
        let target = self.base_path.join(path);
        self.store
            .keys()
            .into_iter()
            .filter(|key| KeyPath::parse(key).starts_with(&target))
            .try_for_each(|key| self.store.remove_item(&key))
    }
}
