//! Layered configuration trees.
//!
//! A [`Config`] merges the trees reported by an ordered list of
//! [`Provider`]s into a single JSON-shaped tree, normalises it with
//! [`schema`] rules and hands out path-addressed reads and writes. Local
//! edits accumulate in a working tree; [`Config::persist`] computes the
//! structural [`diff`] against the last loaded snapshot and writes it back
//! to every provider registered as mutable.
//!
//! ```rust
//! use layered_config::{Config, MemoryProvider, ProviderOptions, ProviderSpec};
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let user = MemoryProvider::new(json!({"cpanel": {"staffer": {"id": 97}}}))?;
//! let mut config = Config::new();
//! config
//!     .use_provider(json!({"cpanel": {"theme": "dark"}}), ProviderOptions::new())?
//!     .use_provider(ProviderSpec::instance(user), ProviderOptions::new().mutable(true))?
//!     .schema(&json!({"cpanel.lang": "en"}))?;
//! config.reload().await?;
//!
//! config.of("cpanel.staffer").set("id", json!(100));
//! config.persist().await?;
//! config.reload().await?;
//! assert_eq!(config.get("cpanel.staffer.id"), Some(&json!(100)));
//! assert_eq!(config.get("cpanel.theme"), Some(&json!("dark")));
//! assert_eq!(config.get("cpanel.lang"), Some(&json!("en")));
//! # Ok::<_, std::sync::Arc<layered_config::ConfigError>>(())
//! # })?;
//! # Ok::<_, std::sync::Arc<layered_config::ConfigError>>(())
//! ```

use std::sync::Arc;

mod config;
pub mod diff;
mod error;
pub mod merge;
pub mod parser;
mod path;
pub mod provider;
mod result_ext;
pub mod schema;
pub mod tree;

pub use config::{Callback, Config, ConfigNamespace, ConfigState, SubscriptionId};
pub use diff::{Change, Diff};
pub use error::ConfigError;
pub use path::{KeyPath, Segment};
pub use provider::{
    DirectoryProvider, EnvProvider, FigmentProvider, FileProvider, FunctionProvider,
    KeyValueStore, LoadFn, MemoryProvider, MemoryStore, ObjectProvider, Provider, ProviderFactory,
    ProviderOptions, ProviderRegistry, ProviderSpec, StorageProvider,
};
pub use result_ext::{ConfigResultExt, ProviderResultExt};
pub use schema::{Schema, SchemaRule};
pub use tree::ConfigTree;

/// Result type used throughout the crate. Errors are shared so a single
/// failure can be reported to several callers.
pub type ConfigResult<T> = Result<T, Arc<ConfigError>>;
