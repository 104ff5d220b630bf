//! YAML format backed by `serde_yaml`.

use serde_json::Value;

use super::Parser;
use crate::{ConfigError, ConfigResult};

/// Reads and writes YAML documents.
#[derive(Clone, Copy, Debug, Default)]
pub struct YamlParser;

impl Parser for YamlParser {
    fn format(&self) -> &'static str {
        "YAML"
    }

    fn parse(&self, text: &str) -> ConfigResult<Value> {
        // An empty document is an empty tree rather than `null`.
        if text.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        serde_yaml::from_str(text).map_err(|err| ConfigError::parse(self.format(), err))
    }

    fn stringify(&self, tree: &Value) -> ConfigResult<String> {
        serde_yaml::to_string(tree).map_err(|err| ConfigError::parse(self.format(), err))
    }
}
