//! JSON format backed by `serde_json`.

use serde_json::Value;

use super::Parser;
use crate::{ConfigError, ConfigResult};

/// Reads and writes JSON. Output is pretty-printed unless built with
/// [`JsonParser::compact`].
#[derive(Clone, Copy, Debug)]
pub struct JsonParser {
    pretty: bool,
}

impl JsonParser {
    /// A parser that writes single-line JSON.
    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Parser for JsonParser {
    fn format(&self) -> &'static str {
        "JSON"
    }

    fn parse(&self, text: &str) -> ConfigResult<Value> {
        serde_json::from_str(text).map_err(|err| ConfigError::parse(self.format(), err))
    }

    fn stringify(&self, tree: &Value) -> ConfigResult<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(tree)
        } else {
            serde_json::to_string(tree)
        };
        rendered.map_err(|err| ConfigError::parse(self.format(), err))
    }
}
