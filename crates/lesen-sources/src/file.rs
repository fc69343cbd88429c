//! Local file content source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use lesen_core::traits::ContentSource;

use crate::error::{is_permanent_error, SourceError};

/// Reads the content document from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ContentSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> anyhow::Result<String> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SourceError::NotFound(self.path.display().to_string()),
                _ => SourceError::Network(format!("{}: {e}", self.path.display())),
            })?;
        tracing::debug!(bytes = content.len(), "content document read");
        Ok(content)
    }
    fn is_permanent(&self, error: &anyhow::Error) -> bool {
        is_permanent_error(error)
    }
}
