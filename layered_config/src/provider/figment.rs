//! Adapter exposing a [`figment::Figment`] stack as a provider.

use async_trait::async_trait;
use figment::Figment;
use serde_json::Value;

use super::Provider;
use crate::{ConfigError, ConfigResult};

/// Read-only provider extracting a tree from a figment stack.
///
/// ```
/// use figment::{Figment, providers::Serialized};
/// use layered_config::{FigmentProvider, Provider};
/// use serde_json::json;
///
/// let figment = Figment::from(Serialized::defaults(json!({"port": 8080})));
/// let tree = futures::executor::block_on(FigmentProvider::new(figment).load());
/// assert_eq!(tree.ok(), Some(json!({"port": 8080})));
/// ```
#[derive(Debug)]
pub struct FigmentProvider {
    figment: Figment,
}

impl FigmentProvider {
    /// Wrap `figment`.
    #[must_use]
    pub const fn new(figment: Figment) -> Self {
        Self { figment }
    }
}

#[async_trait]
impl Provider for FigmentProvider {
    fn name(&self) -> &str {
        "figment"
    }

    async fn load(&self) -> ConfigResult<Value> {
        self.figment.extract().map_err(ConfigError::gathering)
    }
}
