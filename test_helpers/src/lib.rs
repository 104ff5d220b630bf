//! Test helpers shared across crates in the workspace.
//!
//! - [`env`]: serialised, self-restoring environment variable edits.
//! - [`providers`]: scripted providers that record writes or fail on demand.
//! - [`jail`]: `figment::Jail` sandboxes returning `anyhow::Result`.

pub mod env;
pub mod jail;
pub mod providers;

pub use jail::with_jail;
pub use providers::{FailingProvider, RecordingProvider, Write};
