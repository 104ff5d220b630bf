//! Writable in-memory provider.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::Provider;
use crate::path::KeyPath;
use crate::{ConfigError, ConfigResult, tree};

/// Writable provider holding its tree in memory.
///
/// Writes modify the held tree, so a later reload observes them. It has no
/// registry name; pass it as an instance:
///
/// ```
/// use layered_config::{Config, MemoryProvider, ProviderOptions, ProviderSpec};
/// use serde_json::json;
///
/// let mut config = Config::new();
/// config.use_provider(
///     ProviderSpec::instance(MemoryProvider::new(json!({"a": 1}))?),
///     ProviderOptions::new().mutable(true),
/// )?;
/// assert_eq!(config.mutable_provider_count(), 1);
/// # Ok::<_, std::sync::Arc<layered_config::ConfigError>>(())
/// ```
#[derive(Debug)]
pub struct MemoryProvider {
    tree: Mutex<Value>,
}

impl MemoryProvider {
    /// Hold `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProvider`] when `tree` is not an object.
    pub fn new(tree: Value) -> ConfigResult<Self> {
        if !tree.is_object() {
            return Err(ConfigError::invalid_provider(
                "a memory provider needs an object tree",
            ));
        }
        Ok(Self {
            tree: Mutex::new(tree),
        })
    }

    /// Hold an empty tree.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tree: Mutex::new(Value::Object(Map::new())),
        }
    }

    /// Copy of the tree currently held.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.tree.lock().clone()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl Provider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> ConfigResult<Value> {
        Ok(self.snapshot())
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn set(&self, path: &KeyPath, value: &Value) -> ConfigResult<()> {
        tree::set(&mut self.tree.lock(), path, value.clone());
        Ok(())
    }

    async fn remove(&self, path: &KeyPath) -> ConfigResult<()> {
        tree::unset(&mut self.tree.lock(), path);
        Ok(())
    }
}
