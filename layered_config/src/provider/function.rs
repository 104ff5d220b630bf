//! Provider backed by an asynchronous loader function.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use super::Provider;
use crate::ConfigResult;

/// Shared loader invoked on every [`Provider::load`].
pub type LoadFn = Arc<dyn Fn() -> BoxFuture<'static, ConfigResult<Value>> + Send + Sync>;

pub(super) fn boxed_loader<F, Fut>(loader: F) -> LoadFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ConfigResult<Value>> + Send + 'static,
{
    Arc::new(move || Box::pin(loader()))
}

/// Read-only provider whose tree comes from a user-supplied loader.
///
/// ```
/// use layered_config::{FunctionProvider, Provider};
/// use serde_json::json;
///
/// let provider = FunctionProvider::new(|| async { Ok(json!({"region": "eu"})) });
/// let tree = futures::executor::block_on(provider.load());
/// assert_eq!(tree.ok(), Some(json!({"region": "eu"})));
/// ```
#[derive(Clone)]
pub struct FunctionProvider {
    loader: LoadFn,
}

impl FunctionProvider {
    /// Wrap an async closure.
    #[must_use]
    pub fn new<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ConfigResult<Value>> + Send + 'static,
    {
        Self {
            loader: boxed_loader(loader),
        }
    }

    /// Wrap an already shared loader.
    #[must_use]
    pub const fn from_load_fn(loader: LoadFn) -> Self {
        Self { loader }
    }
}

impl fmt::Debug for FunctionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for FunctionProvider {
    fn name(&self) -> &str {
        "function"
    }

    async fn load(&self) -> ConfigResult<Value> {
        (self.loader)().await
    }
}
