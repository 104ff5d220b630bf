//! Pluggable text formats for file-backed providers.
//!
//! A [`Parser`] turns file contents into a configuration tree and back.
//! JSON is always available; YAML and TOML sit behind the `yaml` and `toml`
//! features.

mod json;
#[cfg(feature = "toml")]
mod toml;
#[cfg(feature = "yaml")]
mod yaml;

pub use json::JsonParser;
#[cfg(feature = "toml")]
pub use self::toml::TomlParser;
#[cfg(feature = "yaml")]
pub use yaml::YamlParser;

use std::fmt;
use std::sync::Arc;

use camino::Utf8Path;
use serde_json::Value;

use crate::ConfigResult;

/// Converts between configuration text and trees.
pub trait Parser: Send + Sync + fmt::Debug {
    /// Short human-readable name of the format, used in error messages.
    fn format(&self) -> &'static str;

    /// Parse `text` into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Parse`] when `text` is malformed.
    fn parse(&self, text: &str) -> ConfigResult<Value>;

    /// Render `tree` as text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Parse`] when the format cannot express
    /// `tree`.
    fn stringify(&self, tree: &Value) -> ConfigResult<String>;
}

/// Choose a parser from the file extension of `path`.
///
/// `.yaml`/`.yml` and `.toml` select their parsers when the matching feature
/// is enabled; everything else falls back to JSON.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use layered_config::parser::parser_for_path;
///
/// assert_eq!(parser_for_path(Utf8Path::new("app.json")).format(), "JSON");
/// assert_eq!(parser_for_path(Utf8Path::new("notes.txt")).format(), "JSON");
/// ```
#[must_use]
pub fn parser_for_path(path: &Utf8Path) -> Arc<dyn Parser> {
    let ext = path.extension().map(str::to_ascii_lowercase);
    match ext.as_deref() {
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => Arc::new(YamlParser),
        #[cfg(feature = "toml")]
        Some("toml") => Arc::new(TomlParser),
        _ => Arc::new(JsonParser::default()),
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests panic to surface configuration mistakes"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn sample() -> Value {
        json!({"cpanel": {"staffer": {"id": 97, "name": "lxndr", "tags": ["a", "b"]}}, "on": true})
    }

    #[rstest]
    #[case::json(Arc::new(JsonParser::default()) as Arc<dyn Parser>)]
    #[case::json_compact(Arc::new(JsonParser::compact()) as Arc<dyn Parser>)]
    #[cfg_attr(feature = "yaml", case::yaml(Arc::new(YamlParser) as Arc<dyn Parser>))]
    #[cfg_attr(feature = "toml", case::toml(Arc::new(TomlParser) as Arc<dyn Parser>))]
    fn formats_preserve_trees(#[case] parser: Arc<dyn Parser>) {
        let text = parser.stringify(&sample()).expect("stringify");
        assert_eq!(parser.parse(&text).expect("parse"), sample());
    }

    #[rstest]
    #[case::json(Arc::new(JsonParser::default()) as Arc<dyn Parser>, "{\"a\": ")]
    #[cfg_attr(feature = "yaml", case::yaml(Arc::new(YamlParser) as Arc<dyn Parser>, "a: [1"))]
    #[cfg_attr(feature = "toml", case::toml(Arc::new(TomlParser) as Arc<dyn Parser>, "a = "))]
    fn malformed_text_is_a_parse_error(#[case] parser: Arc<dyn Parser>, #[case] text: &str) {
        let err = parser.parse(text).expect_err("must fail");
        assert!(matches!(&*err, crate::ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with(parser.format()));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_extensions_select_yaml() {
        assert_eq!(parser_for_path(Utf8Path::new("conf/app.YML")).format(), "YAML");
    }

    #[cfg(feature = "toml")]
    #[test]
    fn toml_cannot_hold_nulls() {
        let err = TomlParser.stringify(&json!({"a": null})).expect_err("must fail");
        assert!(matches!(&*err, crate::ConfigError::Parse { format: "TOML", .. }));
    }
}
