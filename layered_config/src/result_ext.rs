//! Extensions for mapping errors to `ConfigResult` concisely.
//!
//! These helpers replace `.map_err(|e| Arc::new(e.into()))` when converting
//! external error types into the crate's `ConfigResult<T>` alias
//! (`Result<T, Arc<ConfigError>>`).
//!
//! # Examples
//!
//! ```
//! use layered_config::{ConfigResult, ConfigResultExt};
//!
//! fn encode() -> ConfigResult<String> {
//!     // serde_json::Error implements Into<ConfigError>
//!     serde_json::to_string(&42).into_config()
//! }
//! # assert_eq!(encode().ok().as_deref(), Some("42"));
//! ```

use std::sync::Arc;

use crate::{ConfigError, ConfigResult};

/// Generic extension for mapping any `Result<T, E>` with
/// `E: Into<ConfigError>` into a `ConfigResult<T>`.
pub trait ConfigResultExt<T> {
    /// Convert `Result<T, E>` into `ConfigResult<T>` using `Into<ConfigError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into `Arc<ConfigError>`.
    fn into_config(self) -> ConfigResult<T>;
}

impl<T, E> ConfigResultExt<T> for Result<T, E>
where
    E: Into<ConfigError>,
{
    fn into_config(self) -> ConfigResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}

/// Extension attaching a provider name to arbitrary failures.
pub trait ProviderResultExt<T> {
    /// Wrap the error as [`ConfigError::Provider`] for `provider`.
    ///
    /// # Errors
    ///
    /// Returns the wrapped error when the input is `Err`.
    fn for_provider(self, provider: &str) -> ConfigResult<T>;
}

impl<T, E> ProviderResultExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn for_provider(self, provider: &str) -> ConfigResult<T> {
        self.map_err(|e| ConfigError::provider(provider, e))
    }
}
