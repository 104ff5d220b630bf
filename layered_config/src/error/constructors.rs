//! Shorthand constructors returning shared `ConfigError` values.

use std::error::Error;
use std::sync::Arc;

use camino::Utf8Path;

use super::ConfigError;

impl ConfigError {
    /// Construct an [`ConfigError::UnknownProvider`] for `name`.
    #[must_use]
    pub fn unknown_provider(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::UnknownProvider { name: name.into() })
    }

    /// Construct an [`ConfigError::InvalidProvider`] with `reason`.
    ///
    /// # Examples
    ///
    /// ```
    /// use layered_config::ConfigError;
    /// let e = ConfigError::invalid_provider("missing `path` option");
    /// assert!(matches!(&*e, ConfigError::InvalidProvider { .. }));
    /// ```
    #[must_use]
    pub fn invalid_provider(reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::InvalidProvider {
            reason: reason.into(),
        })
    }

    /// Construct an [`ConfigError::InvalidSchemaDescriptor`] with `reason`.
    #[must_use]
    pub fn invalid_schema(reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::InvalidSchemaDescriptor {
            reason: reason.into(),
        })
    }

    /// Construct an [`ConfigError::ReadOnly`] for `provider`.
    #[must_use]
    pub fn read_only(provider: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::ReadOnly {
            provider: provider.into(),
        })
    }

    /// Construct an [`ConfigError::File`] for a configuration path.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use layered_config::ConfigError;
    /// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    /// let e = ConfigError::file(Utf8Path::new("app.json"), io);
    /// assert!(e.to_string().contains("app.json"));
    /// ```
    #[must_use]
    pub fn file(path: &Utf8Path, err: impl Into<Box<dyn Error + Send + Sync>>) -> Arc<Self> {
        Arc::new(Self::File {
            path: path.to_path_buf(),
            source: err.into(),
        })
    }

    /// Construct an [`ConfigError::Parse`] for a parser `format`.
    #[must_use]
    pub fn parse(format: &'static str, err: impl Into<Box<dyn Error + Send + Sync>>) -> Arc<Self> {
        Arc::new(Self::Parse {
            format,
            source: err.into(),
        })
    }

    /// Construct an [`ConfigError::Storage`] for `key`.
    #[must_use]
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::Storage {
            key: key.into(),
            message: message.into(),
        })
    }

    /// Construct an [`ConfigError::Provider`] wrapping a custom provider failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use layered_config::ConfigError;
    /// let e = ConfigError::provider("vault", "sealed");
    /// assert_eq!(e.to_string(), "provider 'vault' failed: sealed");
    /// ```
    #[must_use]
    pub fn provider(
        provider: impl Into<String>,
        err: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Arc<Self> {
        Arc::new(Self::Provider {
            provider: provider.into(),
            source: err.into(),
        })
    }

    /// Construct a gathering error from a [`figment::Error`].
    #[must_use]
    pub fn gathering(source: figment::Error) -> Arc<Self> {
        Arc::new(Self::Gathering(Box::new(source)))
    }
}
