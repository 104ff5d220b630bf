//! Configuration sources.
//!
//! A [`Provider`] supplies a configuration tree on [`Provider::load`] and,
//! when [`Provider::is_writable`] reports so, accepts path-addressed writes
//! during persistence. Built-in kinds are constructed by name through a
//! [`ProviderRegistry`] from [`ProviderOptions`].

mod directory;
mod env;
mod figment;
mod file;
mod function;
mod memory;
mod object;
mod options;
mod registry;
mod storage;

pub use directory::{DEFAULT_PATTERN, DirectoryProvider};
pub use env::{DEFAULT_DELIMITER, DEFAULT_VARIABLE, EnvProvider};
pub use self::figment::FigmentProvider;
pub use file::FileProvider;
pub use function::{FunctionProvider, LoadFn};
pub use memory::MemoryProvider;
pub use object::ObjectProvider;
pub use options::{ProviderOptions, ProviderSpec};
pub use registry::{ProviderFactory, ProviderRegistry};
pub use storage::{KeyValueStore, MemoryStore, StorageProvider};

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::path::KeyPath;
use crate::{ConfigError, ConfigResult};

/// A source of configuration, optionally accepting writes.
///
/// Implementations use interior mutability for any state touched by
/// [`Provider::set`] and [`Provider::remove`]; the façade only ever holds
/// shared references to its providers.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use layered_config::{ConfigResult, Provider};
/// use serde_json::{Value, json};
///
/// #[derive(Debug)]
/// struct Fixed;
///
/// #[async_trait]
/// impl Provider for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     async fn load(&self) -> ConfigResult<Value> {
///         Ok(json!({"answer": 42}))
///     }
/// }
///
/// assert!(!Fixed.is_writable());
/// ```
#[async_trait]
pub trait Provider: Send + Sync + fmt::Debug {
    /// Identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Produce this provider's configuration tree.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying source cannot be read or
    /// decoded.
    async fn load(&self) -> ConfigResult<Value>;

    /// Whether [`Provider::set`] and [`Provider::remove`] are supported.
    fn is_writable(&self) -> bool {
        false
    }

    /// Write `value` at `path`.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`ConfigError::ReadOnly`].
    async fn set(&self, _path: &KeyPath, _value: &Value) -> ConfigResult<()> {
        Err(ConfigError::read_only(self.name()))
    }

    /// Delete whatever lives at `path`.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`ConfigError::ReadOnly`].
    async fn remove(&self, _path: &KeyPath) -> ConfigResult<()> {
        Err(ConfigError::read_only(self.name()))
    }
}
