//! Helpers for mutating environment variables in tests.
//!
//! Every mutation and every restoration takes a process-wide re-entrant
//! lock, so guards created on different threads never interleave a write.
//! Hold [`lock`] across a whole test when several variables must change
//! together.
//!
//! ```
//! use layered_config_test_helpers::env;
//!
//! let _g = env::set_pairs("APP_CONFIG", &[("db.host", "localhost"), ("db.port", "5432")], ",");
//! assert_eq!(std::env::var("APP_CONFIG").ok().as_deref(), Some("db.host=localhost,db.port=5432"));
//! ```

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

static ENV_LOCK: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Restores one variable to its previous state when dropped.
#[must_use = "dropping restores the previous value"]
pub struct EnvGuard {
    key: String,
    previous: Option<OsString>,
}

impl EnvGuard {
    /// Variable this guard restores.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for EnvGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvGuard")
            .field("key", &self.key)
            .field("was_set", &self.previous.is_some())
            .finish()
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        let _lock = ENV_LOCK.lock();
        match self.previous.take() {
            // SAFETY: environment writes are serialised by `ENV_LOCK`.
            Some(value) => unsafe { env::set_var(&self.key, value) },
            // SAFETY: environment writes are serialised by `ENV_LOCK`.
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

/// Exclusive access to the environment for as long as it lives.
#[must_use = "dropping releases the environment lock"]
pub struct EnvLock {
    _guard: ReentrantMutexGuard<'static, ()>,
}

impl fmt::Debug for EnvLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnvLock")
    }
}

/// Take the environment lock. Guards created while it is held still lock
/// re-entrantly on the same thread.
pub fn lock() -> EnvLock {
    EnvLock {
        _guard: ENV_LOCK.lock(),
    }
}

fn mutate(key: String, apply: impl FnOnce(&str)) -> EnvGuard {
    let _lock = ENV_LOCK.lock();
    let previous = env::var_os(&key);
    apply(&key);
    EnvGuard { key, previous }
}

/// Set `key` to `value` until the guard drops.
pub fn set_var(key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvGuard {
    // SAFETY: `mutate` holds `ENV_LOCK` while applying.
    mutate(key.into(), |k| unsafe { env::set_var(k, value.as_ref()) })
}

/// Unset `key` until the guard drops.
pub fn remove_var(key: impl Into<String>) -> EnvGuard {
    // SAFETY: `mutate` holds `ENV_LOCK` while applying.
    mutate(key.into(), |k| unsafe { env::remove_var(k) })
}

/// Set `key` to `k=v` pairs joined by `delimiter`, the shape read by the
/// `env` provider.
pub fn set_pairs(key: impl Into<String>, pairs: &[(&str, &str)], delimiter: &str) -> EnvGuard {
    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(delimiter);
    set_var(key, joined)
}
