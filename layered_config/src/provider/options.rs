//! Construction options for providers and the forms a provider can be
//! supplied in.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;

use super::{KeyValueStore, LoadFn, Provider};
use crate::ConfigResult;
use crate::parser::Parser;
use crate::path::KeyPath;

/// Builder-style options passed to provider factories.
///
/// Each built-in kind reads only the fields it understands; the rest are
/// ignored.
///
/// ```
/// use layered_config::ProviderOptions;
///
/// let options = ProviderOptions::new()
///     .path("config/app.yaml")
///     .mutable(true);
/// assert!(options.is_mutable());
/// assert_eq!(options.file_path().map(|p| p.as_str()), Some("config/app.yaml"));
/// ```
#[derive(Clone, Default)]
pub struct ProviderOptions {
    mutable: bool,
    path: Option<Utf8PathBuf>,
    pattern: Option<String>,
    parser: Option<Arc<dyn Parser>>,
    variable: Option<String>,
    delimiter: Option<String>,
    value: Option<Value>,
    loader: Option<LoadFn>,
    storage: Option<Arc<dyn KeyValueStore>>,
    base_path: Option<KeyPath>,
}

impl ProviderOptions {
    /// Options with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that persisted changes be written to this provider.
    ///
    /// The flag only takes effect when the provider supports writes.
    #[must_use]
    pub const fn mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    /// Alias of [`ProviderOptions::mutable`].
    #[must_use]
    pub const fn writable(self, writable: bool) -> Self {
        self.mutable(writable)
    }

    /// File read by the `file` provider.
    #[must_use]
    pub fn path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Glob expanded by the `directory` provider.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Parser used by file-backed providers instead of the one implied by
    /// the file extension.
    #[must_use]
    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Environment variable read by the `env` provider.
    #[must_use]
    pub fn variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    /// Pair separator used by the `env` provider.
    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Tree served by the `object` provider.
    #[must_use]
    pub fn value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Loader invoked by the `function` provider.
    #[must_use]
    pub fn loader<F, Fut>(mut self, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ConfigResult<Value>> + Send + 'static,
    {
        self.loader = Some(super::function::boxed_loader(loader));
        self
    }

    /// Key/value store backing the `localStorage` provider.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Prefix under which the `localStorage` provider keeps its keys.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<KeyPath>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Whether writes were requested.
    #[must_use]
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Configured file path.
    #[must_use]
    pub fn file_path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Configured glob pattern.
    #[must_use]
    pub fn glob_pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Configured parser override.
    #[must_use]
    pub fn parser_override(&self) -> Option<&Arc<dyn Parser>> {
        self.parser.as_ref()
    }

    /// Configured environment variable name.
    #[must_use]
    pub fn env_variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    /// Configured pair delimiter.
    #[must_use]
    pub fn env_delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref()
    }

    /// Configured object tree.
    #[must_use]
    pub const fn tree(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Configured loader.
    #[must_use]
    pub const fn load_fn(&self) -> Option<&LoadFn> {
        self.loader.as_ref()
    }

    /// Configured key/value store.
    #[must_use]
    pub const fn store(&self) -> Option<&Arc<dyn KeyValueStore>> {
        self.storage.as_ref()
    }

    /// Configured storage prefix.
    #[must_use]
    pub const fn storage_prefix(&self) -> Option<&KeyPath> {
        self.base_path.as_ref()
    }
}

impl fmt::Debug for ProviderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderOptions")
            .field("mutable", &self.mutable)
            .field("path", &self.path)
            .field("pattern", &self.pattern)
            .field("parser", &self.parser)
            .field("variable", &self.variable)
            .field("delimiter", &self.delimiter)
            .field("value", &self.value)
            .field("loader", &self.loader.as_ref().map(|_| "<fn>"))
            .field("storage", &self.storage)
            .field("base_path", &self.base_path)
            .finish()
    }
}

/// The forms in which a provider can be handed to
/// [`Config::use_provider`](crate::Config::use_provider).
#[derive(Debug)]
pub enum ProviderSpec {
    /// Build a registered kind by name.
    Named(String),
    /// Serve a fixed object tree.
    Tree(Value),
    /// Use a ready-made provider.
    Instance(Box<dyn Provider>),
}

impl ProviderSpec {
    /// Wrap a concrete provider.
    #[must_use]
    pub fn instance(provider: impl Provider + 'static) -> Self {
        Self::Instance(Box::new(provider))
    }
}

impl From<&str> for ProviderSpec {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for ProviderSpec {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Value> for ProviderSpec {
    fn from(tree: Value) -> Self {
        Self::Tree(tree)
    }
}

impl From<Box<dyn Provider>> for ProviderSpec {
    fn from(provider: Box<dyn Provider>) -> Self {
        Self::Instance(provider)
    }
}
