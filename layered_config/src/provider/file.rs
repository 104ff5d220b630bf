//! Provider reading and writing a single configuration file.

use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::trace;

use super::Provider;
use crate::parser::{Parser, parser_for_path};
use crate::path::KeyPath;
use crate::{ConfigError, ConfigResult, tree};

/// Provider backed by one file on disk.
///
/// The last loaded tree is kept in memory. Writes apply to that tree and
/// rewrite the whole file with the provider's parser. Writes are serialised
/// so concurrent persistence never interleaves partial files.
#[derive(Debug)]
pub struct FileProvider {
    path: Utf8PathBuf,
    parser: Arc<dyn Parser>,
    values: Mutex<Option<Value>>,
}

impl FileProvider {
    /// Read `path`, choosing the parser from its extension.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        let parser = parser_for_path(&path);
        Self::with_parser(path, parser)
    }

    /// Read `path` with an explicit parser.
    #[must_use]
    pub fn with_parser(path: impl Into<Utf8PathBuf>, parser: Arc<dyn Parser>) -> Self {
        Self {
            path: path.into(),
            parser,
            values: Mutex::new(None),
        }
    }

    /// File this provider reads.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    async fn read(&self) -> ConfigResult<Value> {
        trace!(path = %self.path, format = self.parser.format(), "reading configuration file");
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| ConfigError::file(&self.path, err))?;
        self.parser
            .parse(&text)
            .map_err(|err| ConfigError::file(&self.path, err))
    }

    /// The tree writes start from: the cached tree, else the file on disk,
    /// else an empty object when the file does not exist yet.
    async fn current(&self, cached: Option<&Value>) -> ConfigResult<Value> {
        if let Some(values) = cached {
            return Ok(values.clone());
        }
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|err| ConfigError::file(&self.path, err))?;
        if exists {
            self.read().await
        } else {
            Ok(Value::Object(Map::new()))
        }
    }

    async fn write(&self, values: &Value) -> ConfigResult<()> {
        let text = self
            .parser
            .stringify(values)
            .map_err(|err| ConfigError::file(&self.path, err))?;
        trace!(path = %self.path, bytes = text.len(), "writing configuration file");
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|err| ConfigError::file(&self.path, err))
    }

    async fn update(&self, edit: impl FnOnce(&mut Value) + Send) -> ConfigResult<()> {
        let mut cached = self.values.lock().await;
        let mut values = self.current(cached.as_ref()).await?;
        edit(&mut values);
        self.write(&values).await?;
        *cached = Some(values);
        Ok(())
    }
}

#[async_trait]
impl Provider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> ConfigResult<Value> {
        let values = self.read().await?;
        *self.values.lock().await = Some(values.clone());
        Ok(values)
    }

    fn is_writable(&self) -> bool {
        true
    }

    async fn set(&self, path: &KeyPath, value: &Value) -> ConfigResult<()> {
        self.update(|values| tree::set(values, path, value.clone()))
            .await
    }

    async fn remove(&self, path: &KeyPath) -> ConfigResult<()> {
        self.update(|values| {
            tree::unset(values, path);
        })
        .await
    }
}
