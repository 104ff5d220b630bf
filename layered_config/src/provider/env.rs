//! Provider parsing `key=value` pairs from a single environment variable.

use std::env::{self, VarError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::Provider;
use crate::path::KeyPath;
use crate::{ConfigError, ConfigResult, tree};

/// Variable read when none is configured.
pub const DEFAULT_VARIABLE: &str = "CONFIG";
/// Pair separator used when none is configured.
pub const DEFAULT_DELIMITER: &str = ",";

/// Read-only provider for variables such as
/// `CONFIG="db.host=localhost,db.port=5432"`.
///
/// Keys are parsed as paths. Values are kept as strings; pairs without `=`
/// are skipped and an unset variable yields an empty tree.
#[derive(Clone, Debug)]
pub struct EnvProvider {
    variable: String,
    delimiter: String,
}

impl EnvProvider {
    /// Read `variable` with the default delimiter.
    #[must_use]
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            delimiter: DEFAULT_DELIMITER.to_owned(),
        }
    }

    /// Split pairs on `delimiter` instead of `,`.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Variable this provider reads.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Parse `raw` into a tree using this provider's delimiter.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Value {
        let mut out = Value::Object(Map::new());
        for (key, value) in raw
            .split(self.delimiter.as_str())
            .filter_map(|pair| pair.split_once('='))
        {
            let path = KeyPath::parse(key);
            if path.is_empty() {
                continue;
            }
            tree::set(&mut out, &path, Value::String(value.to_owned()));
        }
        out
    }
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::new(DEFAULT_VARIABLE)
    }
}

#[async_trait]
impl Provider for EnvProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn load(&self) -> ConfigResult<Value> {
        match env::var(&self.variable) {
            Ok(raw) => Ok(self.parse(&raw)),
            Err(VarError::NotPresent) => Ok(Value::Object(Map::new())),
            Err(err @ VarError::NotUnicode(_)) => {
                Err(ConfigError::provider(self.name(), err))
            }
        }
    }
}
