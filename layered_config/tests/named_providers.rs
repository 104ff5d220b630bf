//! Building built-in providers by name through the façade.
#![allow(
    unfulfilled_lint_expectations,
    reason = "clippy::expect_used is denied globally; tests may not hit those branches"
)]
#![expect(
    clippy::expect_used,
    reason = "tests panic to surface configuration mistakes"
)]

use std::future::Future;
use std::sync::Arc;

use anyhow::{Result, ensure};
use layered_config::{Config, ConfigError, MemoryStore, ProviderOptions};
use rstest::rstest;
use serde_json::json;
use serial_test::serial;
use test_helpers::{env, with_jail};

/// Jailed tests are synchronous; file providers still need a runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

#[test]
#[serial]
fn env_provider_reads_default_variable() -> Result<()> {
    let _g = env::set_pairs("CONFIG", &[("db.host", "env-host"), ("flags[0]", "on")], ",");
    let mut config = Config::new();
    config
        .use_provider(json!({"db": {"host": "default", "port": 5432}}), ProviderOptions::new())?
        .use_provider("env", ProviderOptions::new())?;
    block_on(config.reload())??;
    ensure!(config.get("") == Some(&json!({"db": {"host": "env-host", "port": 5432}, "flags": ["on"]})));
    Ok(())
}

#[test]
#[serial]
fn env_provider_honours_variable_and_delimiter() -> Result<()> {
    let _g = env::set_pairs("APP_SETTINGS", &[("a", "1"), ("b.c", "two")], ";");
    let _unset = env::remove_var("CONFIG");
    let mut config = Config::new();
    config
        .use_provider("env", ProviderOptions::new().variable("APP_SETTINGS").delimiter(";"))?
        .use_provider("env", ProviderOptions::new())?;
    block_on(config.reload())??;
    ensure!(config.get("") == Some(&json!({"a": "1", "b": {"c": "two"}})));
    ensure!(config.mutable_provider_count() == 0);
    Ok(())
}

#[test]
fn directory_provider_uses_default_pattern() -> Result<()> {
    with_jail(|j| {
        std::fs::create_dir_all(j.directory().join("config/local"))?;
        j.create_file("config/base.json", r#"{"name": "base", "port": 80}"#)?;
        j.create_file("config/local/override.json", r#"{"port": 8080}"#)?;
        let mut config = Config::new();
        config.use_provider("directory", ProviderOptions::new())?;
        block_on(config.reload())??;
        ensure!(config.get("") == Some(&json!({"name": "base", "port": 8080})));
        Ok(())
    })
}

#[rstest]
#[case::path_only(ProviderOptions::new().path("settings/*.json"), json!({"from": "settings"}))]
#[case::pattern_wins(
    ProviderOptions::new().path("settings/*.json").pattern("other/*.json"),
    json!({"from": "other"})
)]
fn directory_provider_reads_glob_from_path(
    #[case] options: ProviderOptions,
    #[case] expected: serde_json::Value,
) -> Result<()> {
    with_jail(|j| {
        std::fs::create_dir_all(j.directory().join("settings"))?;
        std::fs::create_dir_all(j.directory().join("other"))?;
        std::fs::create_dir_all(j.directory().join("config"))?;
        j.create_file("settings/a.json", r#"{"from": "settings"}"#)?;
        j.create_file("other/a.json", r#"{"from": "other"}"#)?;
        j.create_file("config/a.json", r#"{"from": "default"}"#)?;
        let mut config = Config::new();
        config.use_provider("directory", options)?;
        block_on(config.reload())??;
        ensure!(config.get("") == Some(&expected));
        Ok(())
    })
}

#[cfg(feature = "yaml")]
#[test]
fn directory_provider_accepts_parser_override() -> Result<()> {
    use layered_config::parser::YamlParser;

    with_jail(|j| {
        j.create_file("a.yml", "server:\n  port: 1\n")?;
        j.create_file("b.yml", "server:\n  host: b\n")?;
        let mut config = Config::new();
        config.use_provider(
            "directory",
            ProviderOptions::new().pattern("*.yml").parser(YamlParser),
        )?;
        block_on(config.reload())??;
        ensure!(config.get("server") == Some(&json!({"port": 1, "host": "b"})));
        Ok(())
    })
}

#[cfg(feature = "toml")]
#[test]
fn file_provider_selects_parser_by_extension() -> Result<()> {
    with_jail(|j| {
        j.create_file("app.toml", "[db]\nport = 5432\n")?;
        let mut config = Config::new();
        config.use_provider("file", ProviderOptions::new().path("app.toml").mutable(true))?;
        block_on(config.reload())??;
        config.set("db.host", json!("primary"));
        block_on(config.persist())??;

        let written = std::fs::read_to_string("app.toml")?;
        ensure!(written.contains("host = \"primary\""), "unexpected TOML: {written}");
        Ok(())
    })
}

#[test]
fn missing_file_fails_reload_with_path() -> Result<()> {
    with_jail(|_| {
        let mut config = Config::new();
        config.use_provider("file", ProviderOptions::new().path("absent.json"))?;
        let err = block_on(config.reload())?.expect_err("file is missing");
        ensure!(matches!(&*err, ConfigError::File { path, .. } if path.as_str() == "absent.json"));
        Ok(())
    })
}

#[tokio::test]
async fn local_storage_round_trips_through_store() -> Result<()> {
    let store = Arc::new(MemoryStore::with_items([
        ("prefs.theme", "dark"),
        ("prefs.recent", r#"["a","b"]"#),
    ]));
    let mut config = Config::new();
    config.use_provider(
        "localStorage",
        ProviderOptions::new().storage(store.clone()).mutable(true),
    )?;
    config.reload().await?;
    ensure!(config.get("prefs") == Some(&json!({"theme": "dark", "recent": ["a", "b"]})));

    config.set("prefs.theme", json!("light")).remove("prefs.recent");
    config.persist().await?;
    let items = store.snapshot();
    ensure!(items.get("prefs.theme").map(String::as_str) == Some("light"));
    ensure!(!items.contains_key("prefs.recent"));
    Ok(())
}

#[tokio::test]
async fn function_provider_from_options() -> Result<()> {
    let mut config = Config::new();
    config.use_provider(
        "function",
        ProviderOptions::new()
            .loader(|| async { Ok(json!({"computed": true})) })
            .mutable(true),
    )?;
    config.reload().await?;
    ensure!(config.get("computed") == Some(&json!(true)));
    ensure!(config.mutable_provider_count() == 0);
    Ok(())
}

#[rstest]
#[case::object("object")]
#[case::file("file")]
#[case::storage("localStorage")]
fn providers_missing_options_are_rejected(#[case] name: &str) {
    let err = Config::new()
        .use_provider(name, ProviderOptions::new())
        .map(|_| ())
        .expect_err("missing option");
    assert!(matches!(&*err, ConfigError::InvalidProvider { .. }));
}

#[tokio::test]
async fn custom_factories_can_be_registered() -> Result<()> {
    let mut config = Config::new();
    config
        .register("fixed", |options: &ProviderOptions| {
            let port = if options.is_mutable() { 1 } else { 2 };
            Ok(Box::new(layered_config::ObjectProvider::new(json!({"port": port}))?)
                as Box<dyn layered_config::Provider>)
        })
        .use_provider("fixed", ProviderOptions::new())?;
    config.reload().await?;
    ensure!(config.get("port") == Some(&json!(2)));
    ensure!(config.registry().contains("fixed"));
    Ok(())
}
