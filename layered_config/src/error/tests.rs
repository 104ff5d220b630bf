//! Unit tests for error construction and rendering.
#![allow(
    unfulfilled_lint_expectations,
    reason = "clippy::expect_used is denied globally; tests may not hit those branches"
)]
#![expect(
    clippy::expect_used,
    reason = "tests panic to surface configuration mistakes"
)]

use rstest::rstest;
use std::error::Error as _;
use std::sync::Arc;

use super::ConfigError;
use crate::ConfigResultExt;

#[rstest]
#[case(ConfigError::unknown_provider("ldap"), "provider 'ldap' is unknown")]
#[case(ConfigError::read_only("env"), "provider 'env' is read-only")]
#[case(
    ConfigError::invalid_schema("expected an object"),
    "invalid schema descriptor: expected an object"
)]
#[case(
    ConfigError::storage("app.theme", "quota exceeded"),
    "storage error for key 'app.theme': quota exceeded"
)]
fn renders_messages(#[case] err: Arc<ConfigError>, #[case] expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[test]
fn file_errors_keep_their_source() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
    let err = ConfigError::file(camino::Utf8Path::new("conf/app.json"), io);
    let source = err.source().expect("file error should expose its source");
    assert_eq!(source.to_string(), "no such file");
}

#[test]
fn json_errors_convert_into_parse_errors() {
    let result: Result<serde_json::Value, _> = serde_json::from_str("{broken");
    let err = result.into_config().expect_err("invalid JSON must fail");
    assert!(matches!(&*err, ConfigError::Parse { format: "JSON", .. }));
}

#[test]
fn figment_errors_convert_into_gathering() {
    let err: ConfigError = figment::Error::from(String::from("boom")).into();
    assert!(matches!(err, ConfigError::Gathering(_)));
    assert!(err.to_string().contains("boom"));
}
