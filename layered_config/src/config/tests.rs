//! Unit tests for the configuration façade.
#![allow(
    unfulfilled_lint_expectations,
    reason = "clippy::expect_used is denied globally; tests may not hit those branches"
)]
#![expect(
    clippy::expect_used,
    reason = "tests panic to surface configuration mistakes"
)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, ensure};
use async_trait::async_trait;
use parking_lot::Mutex;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::{Config, ConfigState};
use crate::path::KeyPath;
use crate::provider::{
    FunctionProvider, MemoryProvider, ObjectProvider, Provider, ProviderOptions, ProviderSpec,
};
use crate::schema::SchemaRule;
use crate::{ConfigError, ConfigResult, tree};

/// Writable in-memory provider whose writes can be made to fail.
#[derive(Debug, Default)]
struct Flaky {
    tree: Mutex<Value>,
    fail_writes: AtomicBool,
}

#[async_trait]
impl Provider for Flaky {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn load(&self) -> ConfigResult<Value> {
        Ok(self.tree.lock().clone())
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn set(&self, path: &KeyPath, value: &Value) -> ConfigResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConfigError::provider(self.name(), "disk full"));
        }
        tree::set(&mut self.tree.lock(), path, value.clone());
        Ok(())
    }

    async fn remove(&self, path: &KeyPath) -> ConfigResult<()> {
        tree::unset(&mut self.tree.lock(), path);
        Ok(())
    }
}

#[fixture]
fn staffer() -> Value {
    json!({"cpanel": {"staffer": {"id": 97, "name": "lxndr"}}})
}

async fn loaded(tree: Value) -> Result<Config> {
    let mut config = Config::new();
    config.use_provider(
        ProviderSpec::instance(MemoryProvider::new(tree)?),
        ProviderOptions::new().mutable(true),
    )?;
    config.reload().await?;
    Ok(config)
}

#[test]
fn unknown_names_are_rejected() {
    let mut config = Config::new();
    let err = config
        .use_provider("consul", ProviderOptions::new())
        .expect_err("unregistered kind");
    assert!(matches!(&*err, ConfigError::UnknownProvider { .. }));
    assert_eq!(config.provider_count(), 0);
}

#[test]
fn non_object_trees_are_rejected() {
    let err = Config::new()
        .use_provider(json!([1, 2]), ProviderOptions::new())
        .map(|_| ())
        .expect_err("arrays cannot be providers");
    assert!(matches!(&*err, ConfigError::InvalidProvider { .. }));
}

#[test]
fn mutable_flag_degrades_for_read_only_providers() -> Result<()> {
    let mut config = Config::new();
    config
        .use_provider(
            ProviderSpec::instance(FunctionProvider::new(|| async { Ok(json!({})) })),
            ProviderOptions::new().mutable(true),
        )?
        .use_provider(json!({}), ProviderOptions::new().writable(true))?
        .use_provider(
            ProviderSpec::instance(MemoryProvider::empty()),
            ProviderOptions::new().writable(true),
        )?
        .use_provider(json!({}), ProviderOptions::new())?;
    ensure!(config.provider_count() == 4);
    ensure!(config.mutable_provider_count() == 1);
    Ok(())
}

#[test]
fn literal_trees_are_never_persist_targets() -> Result<()> {
    let mut config = Config::new();
    config
        .use_provider(ProviderSpec::Tree(json!({"a": 1})), ProviderOptions::new().mutable(true))?
        .use_provider(
            ProviderSpec::instance(ObjectProvider::new(json!({"b": 2}))?),
            ProviderOptions::new().mutable(true),
        )?;
    ensure!(config.provider_count() == 2);
    ensure!(config.mutable_provider_count() == 0);
    Ok(())
}

#[tokio::test]
async fn reload_merges_in_registration_order() -> Result<()> {
    let mut config = Config::new();
    config
        .use_provider(json!({"db": {"host": "a", "port": 1}}), ProviderOptions::new())?
        .use_provider(json!({"db": {"port": 2}, "extra": true}), ProviderOptions::new())?;
    ensure!(config.state() == ConfigState::Uninitialized);
    config.reload().await?;
    ensure!(config.state() == ConfigState::Loaded);
    ensure!(config.get(KeyPath::root()) == Some(&json!({"db": {"host": "a", "port": 2}, "extra": true})));
    ensure!(config.pending_changes().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_reload_keeps_previous_trees() -> Result<()> {
    let failing = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&failing);
    let mut config = Config::new();
    config.use_provider(
        ProviderSpec::instance(FunctionProvider::new(move || {
            let fail = flag.load(Ordering::SeqCst);
            async move {
                if fail {
                    Err(ConfigError::provider("remote", "unreachable"))
                } else {
                    Ok(json!({"remote": {"ok": true}}))
                }
            }
        })),
        ProviderOptions::new(),
    )?;
    config.reload().await?;
    config.set("local", json!(1));

    failing.store(true, Ordering::SeqCst);
    let err = config.reload().await.expect_err("provider fails");
    ensure!(matches!(&*err, ConfigError::Provider { .. }));
    ensure!(config.get("remote.ok") == Some(&json!(true)));
    ensure!(config.get("local") == Some(&json!(1)));
    ensure!(config.state() == ConfigState::Loaded);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn reads_resolve_paths(staffer: Value) -> Result<()> {
    let config = loaded(staffer.clone()).await?;
    ensure!(config.get("") == Some(&staffer));
    ensure!(config.get("cpanel.staffer.id") == Some(&json!(97)));
    ensure!(config.get(["cpanel", "staffer", "name"].join(".")) == Some(&json!("lxndr")));
    ensure!(config.get("cpanel.missing").is_none());
    ensure!(config.get_or("cpanel.missing", &json!("fallback")) == &json!("fallback"));
    ensure!(config.get_as::<u32>("cpanel.staffer.id")? == Some(97));
    let err = config
        .get_as::<u32>("cpanel.staffer.name")
        .expect_err("string is not a number");
    ensure!(matches!(&*err, ConfigError::Extract { path, .. } if path == "cpanel.staffer.name"));
    Ok(())
}

#[rstest]
#[case::scalar_replaces("a", json!(5), json!({"a": 5, "list": ["a", "b", "c"]}))]
#[case::object_merges("a", json!({"y": 2}), json!({"a": {"x": 1, "y": 2}, "list": ["a", "b", "c"]}))]
#[case::index_keeps_siblings("list[1]", json!("B"), json!({"a": {"x": 1}, "list": ["a", "B", "c"]}))]
#[case::array_merges_by_position("list", json!(["A"]), json!({"a": {"x": 1}, "list": ["A", "b", "c"]}))]
#[case::creates_parents(
    "new.deep[1]",
    json!(true),
    json!({"a": {"x": 1}, "list": ["a", "b", "c"], "new": {"deep": [null, true]}})
)]
#[case::root_object_merges("", json!({"a": {"z": 0}}), json!({"a": {"x": 1, "z": 0}, "list": ["a", "b", "c"]}))]
#[case::root_scalar_ignored("", json!(3), json!({"a": {"x": 1}, "list": ["a", "b", "c"]}))]
fn set_merges_into_working_tree(#[case] path: &str, #[case] value: Value, #[case] expected: Value) {
    let mut config = Config::new();
    config.set("", json!({"a": {"x": 1}, "list": ["a", "b", "c"]}));
    config.set(path, value);
    assert_eq!(config.get(""), Some(&expected));
}

#[test]
fn oversized_indices_are_ignored() {
    let calls = Arc::new(Mutex::new(0_usize));
    let counter = Arc::clone(&calls);
    let mut config = Config::new();
    config.set("list", json!([1]));
    config.subscribe("list", move |_, _| *counter.lock() += 1);
    let before = config.pending_changes();
    config
        .set("list[18446744073709551615]", json!(2))
        .set("list[65536]", json!(2))
        .remove("list[18446744073709551615]");
    assert_eq!(config.get(""), Some(&json!({"list": [1]})));
    assert_eq!(*calls.lock(), 0);
    assert_eq!(config.pending_changes(), before);
}

#[test]
fn set_many_writes_each_path() {
    let mut config = Config::new();
    let mut values = serde_json::Map::new();
    values.insert("a.b".into(), json!(1));
    values.insert("c[0]".into(), json!("x"));
    config.set_many(values);
    assert_eq!(config.get(""), Some(&json!({"a": {"b": 1}, "c": ["x"]})));
}

#[test]
fn remove_leaves_holes_except_at_the_end() {
    let mut config = Config::new();
    config.set("list", json!([1, 2, 3]));
    config.remove("list[0]").remove("list[2]");
    assert_eq!(config.get("list"), Some(&json!([null, 2])));
}

#[test]
fn observers_fire_once_per_overlapping_write() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut config = Config::new();

    let log = Arc::clone(&seen);
    config.subscribe("db", move |path, value| {
        log.lock().push(format!("db:{path}={}", value.cloned().unwrap_or_default()));
    });
    let log = Arc::clone(&seen);
    config.subscribe("db.port", move |path, value| {
        log.lock().push(format!("port:{path}={}", value.cloned().unwrap_or_default()));
    });
    let log = Arc::clone(&seen);
    let unrelated = config.subscribe("cache", move |path, _| {
        log.lock().push(format!("cache:{path}"));
    });

    config.set("db", json!({"host": "h", "port": 1}));
    config.set("db.port", json!(2));
    config.remove("db.host");
    assert!(config.unsubscribe(unrelated));
    assert!(!config.unsubscribe(unrelated));

    assert_eq!(
        *seen.lock(),
        [
            r#"db:db={"host":"h","port":1}"#,
            "port:db.port=1",
            r#"db:db={"host":"h","port":2}"#,
            "port:db.port=2",
            r#"db:db={"port":2}"#,
        ]
    );
}

#[tokio::test]
async fn schema_registration_is_all_or_nothing() -> Result<()> {
    let mut config = loaded(json!({"sys": {"logging": "{\"level\": 3}"}, "bad": "{oops"})).await?;
    config.schema(&json!({"sys.logging": {"stringified": true}, "flags": {"default": []}}))?;
    ensure!(config.get("sys.logging.level") == Some(&json!(3)));
    ensure!(config.get("flags") == Some(&json!([])));
    ensure!(config.pending_changes().is_empty());

    let before = config.get("").cloned();
    let err = config
        .schema(&json!({"late": 1, "bad": {"stringified": true}}))
        .map(|_| ())
        .expect_err("bad JSON");
    ensure!(matches!(&*err, ConfigError::SchemaCoercion { .. }));
    ensure!(config.get("").cloned() == before);
    ensure!(config.rules().len() == 2);
    Ok(())
}

#[tokio::test]
async fn schema_rules_run_again_on_reload() -> Result<()> {
    let mut config = Config::new();
    config
        .schema_rule(SchemaRule::new("servers").array())?
        .use_provider(json!({"servers": {"1": "b", "0": "a"}}), ProviderOptions::new())?;
    config.reload().await?;
    ensure!(config.get("servers") == Some(&json!(["a", "b"])));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn persist_writes_diff_and_advances_snapshot(staffer: Value) -> Result<()> {
    let mut config = loaded(staffer).await?;
    config.set("cpanel.staffer.id", json!(100)).remove("cpanel.staffer.name");
    ensure!(config.pending_changes().changed.len() == 1);
    ensure!(config.pending_changes().removed == [KeyPath::parse("cpanel.staffer.name")]);

    config.persist().await?;
    ensure!(config.pending_changes().is_empty());

    config.reload().await?;
    ensure!(config.get("cpanel") == Some(&json!({"staffer": {"id": 100}})));
    Ok(())
}

#[tokio::test]
async fn persist_without_mutable_providers_keeps_changes_pending() -> Result<()> {
    let mut config = Config::new();
    config.use_provider(json!({"a": 1}), ProviderOptions::new())?;
    config.reload().await?;
    config.set("a", json!(2));
    config.persist().await?;
    ensure!(!config.pending_changes().is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_container_edits_are_not_persisted() -> Result<()> {
    let mut config = loaded(json!({"a": 1})).await?;
    config.remove("a").set("a", json!({}));
    ensure!(config.get("a") == Some(&json!({})));
    ensure!(config.pending_changes().is_empty());
    config.persist().await?;
    config.reload().await?;
    ensure!(config.get("a") == Some(&json!(1)));
    Ok(())
}

#[tokio::test]
async fn failed_persist_can_be_retried() -> Result<()> {
    let flaky = Arc::new(Flaky::default());
    *flaky.tree.lock() = json!({"a": 1});
    let mut config = Config::new();
    config.use_provider(
        ProviderSpec::Instance(Box::new(Shared(Arc::clone(&flaky)))),
        ProviderOptions::new().mutable(true),
    )?;
    config.reload().await?;
    config.set("a", json!(2));

    flaky.fail_writes.store(true, Ordering::SeqCst);
    let pending = config.pending_changes();
    let err = config.persist().await.expect_err("writes fail");
    ensure!(err.to_string().contains("disk full"));
    ensure!(config.pending_changes() == pending);

    flaky.fail_writes.store(false, Ordering::SeqCst);
    config.persist().await?;
    ensure!(config.pending_changes().is_empty());
    ensure!(*flaky.tree.lock() == json!({"a": 2}));
    Ok(())
}

/// Lets a test keep a handle on a provider owned by the façade.
#[derive(Debug)]
struct Shared(Arc<Flaky>);

#[async_trait]
impl Provider for Shared {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn load(&self) -> ConfigResult<Value> {
        self.0.load().await
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn set(&self, path: &KeyPath, value: &Value) -> ConfigResult<()> {
        self.0.set(path, value).await
    }

    async fn remove(&self, path: &KeyPath) -> ConfigResult<()> {
        self.0.remove(path).await
    }
}

#[tokio::test]
async fn reset_keeps_rules_and_observers() -> Result<()> {
    let mut config = loaded(json!({"a": 1})).await?;
    config.schema(&json!({"b": 2}))?;
    config.subscribe("a", |_, _| {});
    config.reset();
    ensure!(config.provider_count() == 0);
    ensure!(config.state() == ConfigState::Uninitialized);
    ensure!(config.get("") == Some(&json!({})));
    ensure!(config.rules().len() == 1);
    ensure!(config.observer_count() == 1);
    Ok(())
}

#[test]
fn namespaces_scope_every_operation() -> Result<()> {
    let mut config = Config::new();
    {
        let mut ns = config.of("cpanel");
        ns.set("staffer.id", json!(97));
        ns.set("", json!({"theme": "dark"}));
        let mut values = serde_json::Map::new();
        values.insert("staffer.name".into(), json!("lxndr"));
        ns.set_many(values);
        ensure!(ns.path() == &KeyPath::parse("cpanel"));
        ensure!(ns.get_as::<u32>("staffer.id")? == Some(97));

        let mut staffer = ns.of("staffer");
        ensure!(staffer.path() == &KeyPath::parse("cpanel.staffer"));
        staffer.remove("id");
        ensure!(staffer.get("id").is_none());
        ensure!(staffer.get_or("id", &json!(0)) == &json!(0));
    }
    ensure!(config.get("cpanel") == Some(&json!({"staffer": {"name": "lxndr"}, "theme": "dark"})));
    Ok(())
}
