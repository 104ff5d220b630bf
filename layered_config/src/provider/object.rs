//! In-memory provider serving a fixed tree.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::Provider;
use crate::{ConfigError, ConfigResult};

/// Static provider serving the tree it was built with.
///
/// Literal trees passed to [`Config::use_provider`](crate::Config::use_provider)
/// are wrapped in this provider. It never accepts writes, so asking for it
/// to be mutable degrades to read-only. Use
/// [`MemoryProvider`](super::MemoryProvider) for a writable in-memory layer.
#[derive(Debug)]
pub struct ObjectProvider {
    tree: Value,
}

impl ObjectProvider {
    /// Serve `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProvider`] when `tree` is not an object.
    pub fn new(tree: Value) -> ConfigResult<Self> {
        if !tree.is_object() {
            return Err(ConfigError::invalid_provider(
                "an object provider needs an object tree",
            ));
        }
        Ok(Self { tree })
    }

    /// Serve an empty tree.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tree: Value::Object(Map::new()),
        }
    }

    /// The tree served on every load.
    #[must_use]
    pub const fn tree(&self) -> &Value {
        &self.tree
    }
}

impl Default for ObjectProvider {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl Provider for ObjectProvider {
    fn name(&self) -> &str {
        "object"
    }

    async fn load(&self) -> ConfigResult<Value> {
        Ok(self.tree.clone())
    }
}
