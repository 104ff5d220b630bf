//! Primary error enum for configuration loading and persistence.

use camino::Utf8PathBuf;
use figment::Error as FigmentError;
use thiserror::Error;

/// Errors that can occur while loading, normalising or persisting
/// configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A provider was requested by a name that has no registered factory.
    #[error("provider '{name}' is unknown")]
    UnknownProvider {
        /// Name passed to the registry lookup.
        name: String,
    },

    /// The supplied value cannot act as a configuration provider.
    #[error("invalid provider: {reason}")]
    InvalidProvider {
        /// Why the provider could not be built.
        reason: String,
    },

    /// The schema descriptor is not a mapping of paths to rules.
    #[error("invalid schema descriptor: {reason}")]
    InvalidSchemaDescriptor {
        /// What was wrong with the descriptor.
        reason: String,
    },

    /// A value declared as stringified JSON could not be parsed.
    #[error("schema coercion failed at '{path}': {source}")]
    SchemaCoercion {
        /// Rendered path of the offending rule.
        path: String,
        /// JSON parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A write was issued to a provider without write support.
    #[error("provider '{provider}' is read-only")]
    ReadOnly {
        /// Name of the provider that rejected the write.
        provider: String,
    },

    /// Error originating from a configuration file.
    #[error("configuration file error in '{path}': {source}")]
    File {
        /// Path that triggered the failure.
        path: Utf8PathBuf,
        /// Underlying I/O or parse error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A parser rejected its input or could not serialise a tree.
    #[error("{format} error: {source}")]
    Parse {
        /// Format handled by the failing parser.
        format: &'static str,
        /// Underlying parser error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A key/value store refused an operation.
    #[error("storage error for key '{key}': {message}")]
    Storage {
        /// Storage key involved in the failure.
        key: String,
        /// Human-readable explanation.
        message: String,
    },

    /// A custom provider failed.
    #[error("provider '{provider}' failed: {source}")]
    Provider {
        /// Name of the failing provider.
        provider: String,
        /// Error reported by the provider.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A figment stack could not be extracted into a tree.
    #[error("failed to gather configuration: {0}")]
    Gathering(#[from] Box<FigmentError>),

    /// A value could not be deserialised into the requested type.
    #[error("failed to extract '{path}': {source}")]
    Extract {
        /// Rendered path of the requested value.
        path: String,
        /// Deserialisation failure.
        #[source]
        source: serde_json::Error,
    },
}
