//! Name-to-factory table for provider kinds.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;

use super::{
    DEFAULT_DELIMITER, DEFAULT_PATTERN, DEFAULT_VARIABLE, DirectoryProvider, EnvProvider,
    FileProvider, FunctionProvider, ObjectProvider, Provider, ProviderOptions, StorageProvider,
};
use crate::parser::{JsonParser, Parser};
use crate::{ConfigError, ConfigResult};

/// Builds a provider from options.
pub type ProviderFactory =
    Arc<dyn Fn(&ProviderOptions) -> ConfigResult<Box<dyn Provider>> + Send + Sync>;

/// Factories keyed by provider kind name.
///
/// ```
/// use layered_config::ProviderRegistry;
///
/// let registry = ProviderRegistry::with_builtins();
/// assert_eq!(
///     registry.names().collect::<Vec<_>>(),
///     ["directory", "env", "file", "function", "localStorage", "object"],
/// );
/// ```
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// A registry with no factories.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in kinds.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry
            .register("object", build_object)
            .register("function", build_function)
            .register("file", build_file)
            .register("directory", build_directory)
            .register("env", build_env)
            .register("localStorage", build_storage);
        registry
    }

    /// Add or replace the factory for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ProviderOptions) -> ConfigResult<Box<dyn Provider>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Whether a factory exists for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    /// Build the provider registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProvider`] for unregistered names and
    /// whatever the factory reports otherwise.
    pub fn build(&self, name: &str, options: &ProviderOptions) -> ConfigResult<Box<dyn Provider>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::unknown_provider(name))?;
        factory(options)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

fn missing(kind: &str, option: &str) -> Arc<ConfigError> {
    ConfigError::invalid_provider(format!("the {kind} provider requires the `{option}` option"))
}

fn build_object(options: &ProviderOptions) -> ConfigResult<Box<dyn Provider>> {
    let tree = options.tree().ok_or_else(|| missing("object", "value"))?;
    Ok(Box::new(ObjectProvider::new(tree.clone())?))
}

fn build_function(options: &ProviderOptions) -> ConfigResult<Box<dyn Provider>> {
    let loader = options.load_fn().ok_or_else(|| missing("function", "loader"))?;
    Ok(Box::new(FunctionProvider::from_load_fn(Arc::clone(loader))))
}

fn build_file(options: &ProviderOptions) -> ConfigResult<Box<dyn Provider>> {
    let path = options.file_path().ok_or_else(|| missing("file", "path"))?;
    let provider = match options.parser_override() {
        Some(parser) => FileProvider::with_parser(path, Arc::clone(parser)),
        None => FileProvider::new(path),
    };
    Ok(Box::new(provider))
}

/// The glob comes from `pattern`, then `path`, then [`DEFAULT_PATTERN`].
fn build_directory(options: &ProviderOptions) -> ConfigResult<Box<dyn Provider>> {
    let pattern = options
        .glob_pattern()
        .or_else(|| options.file_path().map(Utf8Path::as_str))
        .unwrap_or(DEFAULT_PATTERN);
    let parser: Arc<dyn Parser> = options
        .parser_override()
        .map_or_else(|| Arc::new(JsonParser::default()) as Arc<dyn Parser>, Arc::clone);
    Ok(Box::new(DirectoryProvider::with_parser(pattern, parser)?))
}

fn build_env(options: &ProviderOptions) -> ConfigResult<Box<dyn Provider>> {
    let provider = EnvProvider::new(options.env_variable().unwrap_or(DEFAULT_VARIABLE))
        .with_delimiter(options.env_delimiter().unwrap_or(DEFAULT_DELIMITER));
    Ok(Box::new(provider))
}

fn build_storage(options: &ProviderOptions) -> ConfigResult<Box<dyn Provider>> {
    let store = options
        .store()
        .ok_or_else(|| missing("localStorage", "storage"))?;
    let mut provider = StorageProvider::new(Arc::clone(store));
    if let Some(base) = options.storage_prefix() {
        provider = provider.with_base_path(base);
    }
    Ok(Box::new(provider))
}
