//! The configuration façade.
//!
//! [`Config`] owns an ordered list of providers and two trees: the stored
//! snapshot (what the providers last reported or were last told) and the
//! working tree that reads and writes operate on. [`Config::persist`] pushes
//! the difference between the two back to every mutable provider.

mod namespace;
mod observer;

pub use namespace::ConfigNamespace;
pub use observer::{Callback, SubscriptionId};

use std::sync::Arc;

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::diff::{self, Diff};
use crate::path::KeyPath;
use crate::provider::{
    ObjectProvider, Provider, ProviderOptions, ProviderRegistry, ProviderSpec,
};
use crate::schema::{MAX_SPARSE_INDEX, Schema, SchemaRule};
use crate::tree::{self, is_container};
use crate::{ConfigError, ConfigResult, merge};
use observer::Observers;

/// Lifecycle of a [`Config`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigState {
    /// No reload has succeeded yet.
    #[default]
    Uninitialized,
    /// At least one reload has succeeded.
    Loaded,
}

#[derive(Debug)]
struct Registered {
    provider: Box<dyn Provider>,
    mutable: bool,
}

/// Layered configuration assembled from providers.
///
/// ```
/// use layered_config::{Config, MemoryProvider, ProviderOptions, ProviderSpec};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let overrides = MemoryProvider::new(json!({"db": {"port": 6432}}))?;
/// let mut config = Config::new();
/// config
///     .use_provider(json!({"db": {"host": "localhost", "port": 5432}}), ProviderOptions::new())?
///     .use_provider(ProviderSpec::instance(overrides), ProviderOptions::new().mutable(true))?;
/// config.reload().await?;
/// assert_eq!(config.get("db.port"), Some(&json!(6432)));
///
/// config.set("db.host", json!("primary"));
/// assert_eq!(config.pending_changes().changed.len(), 1);
/// config.persist().await?;
/// assert!(config.pending_changes().is_empty());
/// # Ok::<_, std::sync::Arc<layered_config::ConfigError>>(())
/// # })?;
/// # Ok::<_, std::sync::Arc<layered_config::ConfigError>>(())
/// ```
#[derive(Debug)]
pub struct Config {
    registry: ProviderRegistry,
    providers: Vec<Registered>,
    schema: Schema,
    stored: Value,
    working: Value,
    observers: Observers,
    state: ConfigState,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_tree() -> Value {
    Value::Object(Map::new())
}

impl Config {
    /// A façade whose registry holds the built-in provider kinds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(ProviderRegistry::with_builtins())
    }

    /// A façade building named providers from `registry`.
    #[must_use]
    pub fn with_registry(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            providers: Vec::new(),
            schema: Schema::default(),
            stored: empty_tree(),
            working: empty_tree(),
            observers: Observers::default(),
            state: ConfigState::Uninitialized,
        }
    }

    /// Add or replace a named provider factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ProviderOptions) -> ConfigResult<Box<dyn Provider>> + Send + Sync + 'static,
    {
        self.registry.register(name, factory);
        self
    }

    /// Registry used for [`ProviderSpec::Named`] lookups.
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Append a provider. Later providers override earlier ones on reload.
    ///
    /// `options.mutable(true)` makes the provider a persistence target when
    /// it supports writes; otherwise the flag is ignored. Literal trees are
    /// served by a static [`ObjectProvider`] and never become targets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProvider`] for unregistered names and
    /// [`ConfigError::InvalidProvider`] when the provider cannot be built.
    pub fn use_provider(
        &mut self,
        spec: impl Into<ProviderSpec>,
        options: ProviderOptions,
    ) -> ConfigResult<&mut Self> {
        let provider: Box<dyn Provider> = match spec.into() {
            ProviderSpec::Named(name) => self.registry.build(&name, &options)?,
            ProviderSpec::Tree(tree) => Box::new(ObjectProvider::new(tree)?),
            ProviderSpec::Instance(provider) => provider,
        };
        let mutable = options.is_mutable() && provider.is_writable();
        if options.is_mutable() && !mutable {
            debug!(provider = provider.name(), "provider does not accept writes; treating as read-only");
        }
        debug!(provider = provider.name(), mutable, position = self.providers.len(), "provider registered");
        self.providers.push(Registered { provider, mutable });
        Ok(self)
    }

    /// Register every rule in `descriptor` and apply them to both trees.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSchemaDescriptor`] for malformed
    /// descriptors and [`ConfigError::SchemaCoercion`] when a stringified
    /// value cannot be parsed. Nothing changes on error.
    pub fn schema(&mut self, descriptor: &Value) -> ConfigResult<&mut Self> {
        let rules = Schema::parse_descriptor(descriptor)?;
        self.add_rules(rules)
    }

    /// Register a single rule. See [`Config::schema`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SchemaCoercion`] when a stringified value
    /// cannot be parsed. Nothing changes on error.
    pub fn schema_rule(&mut self, rule: SchemaRule) -> ConfigResult<&mut Self> {
        self.add_rules(vec![rule])
    }

    fn add_rules(&mut self, rules: Vec<SchemaRule>) -> ConfigResult<&mut Self> {
        let mut added = Schema::default();
        added.extend(rules);
        let mut stored = self.stored.clone();
        let mut working = self.working.clone();
        added.apply(&mut stored)?;
        added.apply(&mut working)?;
        self.stored = stored;
        self.working = working;
        self.schema.extend(added.rules().iter().cloned());
        Ok(self)
    }

    /// Registered schema rules.
    #[must_use]
    pub const fn rules(&self) -> &Schema {
        &self.schema
    }

    /// Load every provider and rebuild both trees.
    ///
    /// Providers load concurrently and merge in registration order. Schema
    /// rules run on the merged tree, which then becomes both the stored
    /// snapshot and the working tree.
    ///
    /// # Errors
    ///
    /// Returns the first provider or schema failure. Both trees are left as
    /// they were.
    pub async fn reload(&mut self) -> ConfigResult<()> {
        let trees = try_join_all(self.providers.iter().map(|entry| entry.provider.load())).await?;
        let mut merged = empty_tree();
        merge::merge_all(&mut merged, &trees);
        self.schema.apply(&mut merged)?;
        self.working.clone_from(&merged);
        self.stored = merged;
        self.state = ConfigState::Loaded;
        debug!(providers = trees.len(), "configuration reloaded");
        Ok(())
    }

    /// Value at `path` in the working tree. The root path yields the whole
    /// tree.
    #[must_use]
    pub fn get(&self, path: impl Into<KeyPath>) -> Option<&Value> {
        tree::get(&self.working, &path.into())
    }

    /// Value at `path`, or `default` when nothing resolves.
    #[must_use]
    pub fn get_or<'a>(&'a self, path: impl Into<KeyPath>, default: &'a Value) -> &'a Value {
        self.get(path).unwrap_or(default)
    }

    /// Deserialise the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Extract`] when the value does not fit `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use layered_config::{Config, ProviderOptions};
    /// use serde_json::json;
    ///
    /// let mut config = Config::new();
    /// config.set("db", json!({"port": 5432}));
    /// assert_eq!(config.get_as::<u16>("db.port")?, Some(5432));
    /// assert_eq!(config.get_as::<u16>("db.host")?, None);
    /// assert!(config.get_as::<String>("db.port").is_err());
    /// # Ok::<_, std::sync::Arc<layered_config::ConfigError>>(())
    /// ```
    pub fn get_as<T: DeserializeOwned>(&self, path: impl Into<KeyPath>) -> ConfigResult<Option<T>> {
        let path = path.into();
        tree::get(&self.working, &path)
            .map(|value| {
                T::deserialize(value).map_err(|source| {
                    Arc::new(ConfigError::Extract {
                        path: path.to_string(),
                        source,
                    })
                })
            })
            .transpose()
    }

    /// Write `value` at `path` in the working tree.
    ///
    /// Containers merge into whatever already lives at `path`; scalars
    /// replace it. An object written at the root path merges into the whole
    /// tree; any other root value is ignored.
    pub fn set(&mut self, path: impl Into<KeyPath>, value: Value) -> &mut Self {
        let path = path.into();
        if path.is_empty() && !value.is_object() {
            warn!(value = %value, "ignoring non-object value written at the configuration root");
            return self;
        }
        let mut touched = Vec::new();
        self.write(&path, value, &mut touched);
        self.observers.notify(&touched, &self.working);
        self
    }

    /// Write every `(path, value)` pair in `values`.
    pub fn set_many(&mut self, values: Map<String, Value>) -> &mut Self {
        let mut touched = Vec::new();
        for (key, value) in values {
            let path = KeyPath::parse(&key);
            if path.is_empty() {
                warn!(key = %key, "ignoring entry with an empty path");
                continue;
            }
            self.write(&path, value, &mut touched);
        }
        self.observers.notify(&touched, &self.working);
        self
    }

    fn write(&mut self, path: &KeyPath, value: Value, touched: &mut Vec<KeyPath>) {
        if !tree::within_bounds(&self.working, path) {
            warn!(path = %path, "ignoring write past array index {MAX_SPARSE_INDEX}");
            return;
        }
        if !path.is_empty() {
            touched.push(path.clone());
        }
        if is_container(&value) {
            if let Some(slot) = tree::get_mut(&mut self.working, path) {
                merge::merge_into(slot, &value, |leaf, _| touched.push(path.join(leaf)));
                return;
            }
        }
        tree::set(&mut self.working, path, value);
    }

    /// Delete `path` from the working tree.
    pub fn remove(&mut self, path: impl Into<KeyPath>) -> &mut Self {
        let path = path.into();
        if tree::unset(&mut self.working, &path).is_some() {
            self.observers.notify(std::slice::from_ref(&path), &self.working);
        }
        self
    }

    /// Changes a [`Config::persist`] call would write, before stringified
    /// rules are collapsed.
    #[must_use]
    pub fn pending_changes(&self) -> Diff {
        diff::diff(&self.stored, &self.working)
    }

    /// Write pending changes to every mutable provider.
    ///
    /// All removals are issued before any change. On success the working
    /// tree becomes the new stored snapshot.
    ///
    /// Only leaf edits are written. Replacing a value with an empty object
    /// or array produces no write, so a later reload restores the provider's
    /// value.
    ///
    /// # Errors
    ///
    /// Returns the first write failure. The stored snapshot is kept, so the
    /// same changes are retried by the next call.
    pub async fn persist(&mut self) -> ConfigResult<()> {
        let targets: Vec<&dyn Provider> = self
            .providers
            .iter()
            .filter(|entry| entry.mutable)
            .map(|entry| entry.provider.as_ref())
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        let mut pending = diff::diff(&self.stored, &self.working);
        self.schema.collapse_stringified(&mut pending, &self.working)?;
        pending.dedup();

        try_join_all(targets.iter().copied().flat_map(|provider| {
            pending.removed.iter().map(move |path| {
                debug!(provider = provider.name(), "remove '{path}'");
                provider.remove(path)
            })
        }))
        .await?;

        try_join_all(targets.iter().copied().flat_map(|provider| {
            pending.changed.iter().map(move |change| {
                debug!(provider = provider.name(), "set '{}' = {}", change.path, change.value);
                provider.set(&change.path, &change.value)
            })
        }))
        .await?;

        self.stored = self.working.clone();
        Ok(())
    }

    /// A view of the subtree at `path`.
    pub fn of(&mut self, path: impl Into<KeyPath>) -> ConfigNamespace<'_> {
        ConfigNamespace::new(self, path.into())
    }

    /// Call `callback` after every write that touches `path`, an ancestor of
    /// it, or a descendant of it.
    pub fn subscribe<F>(&mut self, path: impl Into<KeyPath>, callback: F) -> SubscriptionId
    where
        F: FnMut(&KeyPath, Option<&Value>) + Send + Sync + 'static,
    {
        self.observers.subscribe(path.into(), Box::new(callback))
    }

    /// Drop an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Drop every provider and clear both trees. Rules and observers stay.
    pub fn reset(&mut self) {
        self.providers.clear();
        self.stored = empty_tree();
        self.working = empty_tree();
        self.state = ConfigState::Uninitialized;
    }

    /// Number of registered providers.
    #[must_use]
    pub const fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Number of providers receiving persisted writes.
    #[must_use]
    pub fn mutable_provider_count(&self) -> usize {
        self.providers.iter().filter(|entry| entry.mutable).count()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ConfigState {
        self.state
    }
}

#[cfg(test)]
mod tests;
