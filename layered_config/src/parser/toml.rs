//! TOML format backed by the `toml` crate.

use serde_json::Value;

use super::Parser;
use crate::{ConfigError, ConfigResult};

/// Reads and writes TOML documents. Trees containing `null` cannot be
/// written because TOML has no null value.
#[derive(Clone, Copy, Debug, Default)]
pub struct TomlParser;

impl Parser for TomlParser {
    fn format(&self) -> &'static str {
        "TOML"
    }

    fn parse(&self, text: &str) -> ConfigResult<Value> {
        toml::from_str(text).map_err(|err| ConfigError::parse(self.format(), err))
    }

    fn stringify(&self, tree: &Value) -> ConfigResult<String> {
        toml::to_string_pretty(tree).map_err(|err| ConfigError::parse(self.format(), err))
    }
}
