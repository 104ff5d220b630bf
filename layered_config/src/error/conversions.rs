//! Trait-based conversions between external error types and `ConfigError`.

use figment::Error as FigmentError;

use super::ConfigError;

/// JSON failures outside a schema or extraction context surface as parse
/// errors.
impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            format: "JSON",
            source: Box::new(e),
        }
    }
}

impl From<FigmentError> for ConfigError {
    fn from(e: FigmentError) -> Self {
        Self::Gathering(Box::new(e))
    }
}
