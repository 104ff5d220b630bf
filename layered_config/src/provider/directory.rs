//! Provider merging every file matched by a glob pattern.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use futures::future::try_join_all;
use serde_json::{Map, Value};
use tracing::debug;

use super::{FileProvider, Provider};
use crate::parser::{JsonParser, Parser};
use crate::{ConfigError, ConfigResult, merge};

/// Pattern used when none is configured.
pub const DEFAULT_PATTERN: &str = "config/**/*.json";

/// Read-only provider loading all files matching a glob.
///
/// Matches are sorted by path and merged in that order, so later files win.
#[derive(Debug)]
pub struct DirectoryProvider {
    pattern: String,
    parser: Arc<dyn Parser>,
}

impl DirectoryProvider {
    /// Match `pattern`, parsing every file as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProvider`] when `pattern` is not a
    /// valid glob.
    pub fn new(pattern: impl Into<String>) -> ConfigResult<Self> {
        Self::with_parser(pattern, Arc::new(JsonParser::default()))
    }

    /// Match `pattern`, parsing every file with `parser`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProvider`] when `pattern` is not a
    /// valid glob.
    pub fn with_parser(pattern: impl Into<String>, parser: Arc<dyn Parser>) -> ConfigResult<Self> {
        let pattern = pattern.into();
        glob::Pattern::new(&pattern).map_err(|err| invalid_pattern(&pattern, &err))?;
        Ok(Self { pattern, parser })
    }

    /// Pattern this provider expands.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn matches(&self) -> ConfigResult<Vec<Utf8PathBuf>> {
        let paths = glob::glob(&self.pattern).map_err(|err| invalid_pattern(&self.pattern, &err))?;
        let mut files = paths
            .map(|entry| {
                let path = entry.map_err(|err| {
                    let failed = Utf8PathBuf::from(err.path().to_string_lossy().into_owned());
                    ConfigError::file(&failed, io::Error::from(err))
                })?;
                Utf8PathBuf::from_path_buf(path).map_err(|raw| {
                    ConfigError::invalid_provider(format!(
                        "matched path is not valid UTF-8: {}",
                        raw.display()
                    ))
                })
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        files.sort();
        Ok(files)
    }
}

fn invalid_pattern(pattern: &str, err: &glob::PatternError) -> Arc<ConfigError> {
    ConfigError::invalid_provider(format!("invalid glob pattern '{pattern}': {err}"))
}

#[async_trait]
impl Provider for DirectoryProvider {
    fn name(&self) -> &str {
        "directory"
    }

    async fn load(&self) -> ConfigResult<Value> {
        let files = self
            .matches()?
            .into_iter()
            .map(|path| FileProvider::with_parser(path, Arc::clone(&self.parser)))
            .collect::<Vec<_>>();
        debug!(pattern = %self.pattern, files = files.len(), "loading configuration directory");
        let trees = try_join_all(files.iter().map(|file| file.load())).await?;
        let mut merged = Value::Object(Map::new());
        merge::merge_all(&mut merged, &trees);
        Ok(merged)
    }
}
