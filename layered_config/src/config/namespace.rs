//! Path-scoped view over a [`Config`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::Config;
use crate::ConfigResult;
use crate::path::KeyPath;

/// Reads and writes relative to a fixed prefix of a [`Config`].
///
/// ```
/// use layered_config::Config;
/// use serde_json::json;
///
/// let mut config = Config::new();
/// let mut staffer = config.of("cpanel.staffer");
/// staffer.set("id", json!(100));
/// assert_eq!(staffer.get("id"), Some(&json!(100)));
/// assert_eq!(config.get("cpanel.staffer.id"), Some(&json!(100)));
/// ```
#[derive(Debug)]
pub struct ConfigNamespace<'a> {
    config: &'a mut Config,
    path: KeyPath,
}

impl<'a> ConfigNamespace<'a> {
    pub(super) const fn new(config: &'a mut Config, path: KeyPath) -> Self {
        Self { config, path }
    }

    /// Prefix this view is bound to.
    #[must_use]
    pub const fn path(&self) -> &KeyPath {
        &self.path
    }

    fn full(&self, path: impl Into<KeyPath>) -> KeyPath {
        self.path.join(&path.into())
    }

    /// See [`Config::get`].
    #[must_use]
    pub fn get(&self, path: impl Into<KeyPath>) -> Option<&Value> {
        self.config.get(self.full(path))
    }

    /// See [`Config::get_or`].
    #[must_use]
    pub fn get_or<'b>(&'b self, path: impl Into<KeyPath>, default: &'b Value) -> &'b Value {
        self.config.get_or(self.full(path), default)
    }

    /// See [`Config::get_as`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Extract`] when the value does not fit
    /// `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: impl Into<KeyPath>) -> ConfigResult<Option<T>> {
        self.config.get_as(self.full(path))
    }

    /// See [`Config::set`]. An object written at the view's own path merges
    /// into the subtree.
    pub fn set(&mut self, path: impl Into<KeyPath>, value: Value) -> &mut Self {
        let full = self.full(path);
        self.config.set(full, value);
        self
    }

    /// See [`Config::set_many`]. Keys are relative to the view.
    pub fn set_many(&mut self, values: Map<String, Value>) -> &mut Self {
        let mut scoped = Map::new();
        scoped.extend(
            values
                .into_iter()
                .map(|(key, value)| (self.full(key.as_str()).to_string(), value)),
        );
        self.config.set_many(scoped);
        self
    }

    /// See [`Config::remove`].
    pub fn remove(&mut self, path: impl Into<KeyPath>) -> &mut Self {
        let full = self.full(path);
        self.config.remove(full);
        self
    }

    /// A nested view below this one.
    pub fn of(&mut self, path: impl Into<KeyPath>) -> ConfigNamespace<'_> {
        let full = self.full(path);
        ConfigNamespace::new(&mut *self.config, full)
    }

    /// See [`Config::persist`]. Persistence always covers the whole tree.
    ///
    /// # Errors
    ///
    /// Returns the first provider write failure.
    pub async fn persist(&mut self) -> ConfigResult<()> {
        self.config.persist().await
    }
}
