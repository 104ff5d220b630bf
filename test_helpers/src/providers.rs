//! Scripted providers for exercising load and persist paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use layered_config::{ConfigError, ConfigResult, KeyPath, Provider, tree};
use parking_lot::Mutex;
use serde_json::{Map, Value};

/// One write received by a [`RecordingProvider`].
#[derive(Clone, Debug, PartialEq)]
pub enum Write {
    /// `set(path, value)`.
    Set(KeyPath, Value),
    /// `remove(path)`.
    Remove(KeyPath),
}

impl Write {
    /// Shorthand for a [`Write::Set`] with a parsed path.
    #[must_use]
    pub fn set(path: &str, value: Value) -> Self {
        Self::Set(KeyPath::parse(path), value)
    }

    /// Shorthand for a [`Write::Remove`] with a parsed path.
    #[must_use]
    pub fn remove(path: &str) -> Self {
        Self::Remove(KeyPath::parse(path))
    }
}

#[derive(Debug)]
struct Recording {
    tree: Mutex<Value>,
    writes: Mutex<Vec<Write>>,
}

/// Writable provider that serves an in-memory tree and logs every write.
///
/// Clones share state, so a test can keep one handle while the façade owns
/// another.
///
/// ```
/// use layered_config::{KeyPath, Provider};
/// use layered_config_test_helpers::{RecordingProvider, Write};
/// use serde_json::json;
///
/// let recorder = RecordingProvider::new(json!({"a": 1}));
/// futures::executor::block_on(recorder.set(&KeyPath::parse("a"), &json!(2))).ok();
/// assert_eq!(recorder.writes(), [Write::set("a", json!(2))]);
/// assert_eq!(recorder.tree(), json!({"a": 2}));
/// ```
#[derive(Clone, Debug)]
pub struct RecordingProvider {
    inner: Arc<Recording>,
}

impl RecordingProvider {
    /// Serve `tree`.
    #[must_use]
    pub fn new(tree: Value) -> Self {
        Self {
            inner: Arc::new(Recording {
                tree: Mutex::new(tree),
                writes: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Serve an empty object.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Value::Object(Map::new()))
    }

    /// Writes received so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<Write> {
        self.inner.writes.lock().clone()
    }

    /// Drain the write log.
    #[must_use]
    pub fn take_writes(&self) -> Vec<Write> {
        std::mem::take(&mut *self.inner.writes.lock())
    }

    /// Tree as it stands after all writes.
    #[must_use]
    pub fn tree(&self) -> Value {
        self.inner.tree.lock().clone()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn load(&self) -> ConfigResult<Value> {
        Ok(self.tree())
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn set(&self, path: &KeyPath, value: &Value) -> ConfigResult<()> {
        tree::set(&mut self.inner.tree.lock(), path, value.clone());
        self.inner
            .writes
            .lock()
            .push(Write::Set(path.clone(), value.clone()));
        Ok(())
    }

    async fn remove(&self, path: &KeyPath) -> ConfigResult<()> {
        tree::unset(&mut self.inner.tree.lock(), path);
        self.inner.writes.lock().push(Write::Remove(path.clone()));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Switches {
    loads: AtomicBool,
    writes: AtomicBool,
}

/// Recording provider whose loads and writes fail while switched on.
///
/// Failed operations leave the tree and write log untouched.
#[derive(Clone, Debug)]
pub struct FailingProvider {
    recorder: RecordingProvider,
    switches: Arc<Switches>,
}

impl FailingProvider {
    /// Serve `tree`, initially without failures.
    #[must_use]
    pub fn new(tree: Value) -> Self {
        Self {
            recorder: RecordingProvider::new(tree),
            switches: Arc::default(),
        }
    }

    /// Make [`Provider::load`] fail or succeed.
    pub fn fail_loads(&self, fail: bool) {
        self.switches.loads.store(fail, Ordering::SeqCst);
    }

    /// Make [`Provider::set`] and [`Provider::remove`] fail or succeed.
    pub fn fail_writes(&self, fail: bool) {
        self.switches.writes.store(fail, Ordering::SeqCst);
    }

    /// Writes that succeeded so far.
    #[must_use]
    pub fn writes(&self) -> Vec<Write> {
        self.recorder.writes()
    }

    /// Current tree.
    #[must_use]
    pub fn tree(&self) -> Value {
        self.recorder.tree()
    }

    fn check(&self, switch: &AtomicBool, what: &str) -> ConfigResult<()> {
        if switch.load(Ordering::SeqCst) {
            return Err(ConfigError::provider(self.name(), format!("{what} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn load(&self) -> ConfigResult<Value> {
        self.check(&self.switches.loads, "load")?;
        self.recorder.load().await
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn set(&self, path: &KeyPath, value: &Value) -> ConfigResult<()> {
        self.check(&self.switches.writes, "write")?;
        self.recorder.set(path, value).await
    }

    async fn remove(&self, path: &KeyPath) -> ConfigResult<()> {
        self.check(&self.switches.writes, "write")?;
        self.recorder.remove(path).await
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests panic to surface configuration mistakes"
)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn failing_provider_toggles() {
        let provider = FailingProvider::new(json!({"a": 1}));
        provider.fail_loads(true);
        assert!(block_on(provider.load()).is_err());
        provider.fail_loads(false);
        assert_eq!(block_on(provider.load()).ok(), Some(json!({"a": 1})));

        provider.fail_writes(true);
        let err = block_on(provider.remove(&KeyPath::parse("a"))).expect_err("writes refused");
        assert_eq!(err.to_string(), "provider 'failing' failed: write refused");
        assert!(provider.writes().is_empty());
        assert_eq!(provider.tree(), json!({"a": 1}));
    }

    #[test]
    fn recording_provider_logs_in_order() {
        let recorder = RecordingProvider::empty();
        let handle = recorder.clone();
        block_on(async {
            recorder.remove(&KeyPath::parse("x")).await?;
            recorder.set(&KeyPath::parse("y.z"), &json!(true)).await
        })
        .expect("writes succeed");
        assert_eq!(
            handle.take_writes(),
            [Write::remove("x"), Write::set("y.z", json!(true))]
        );
        assert!(handle.writes().is_empty());
        assert_eq!(handle.tree(), json!({"y": {"z": true}}));
    }
}
