//! Local filesystem adapter for [`Storage`].
//!
//! Relative paths resolve under the configured root; absolute paths are used
//! as given, so a feed path from the command line works with the default root.

use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location on disk that `path` refers to.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let location = self.resolve(path);
        tracing::trace!("reading {}", location.display());
        Ok(tokio::fs::read(location).await?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let location = self.resolve(path);
        if let Some(dir) = location.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        tracing::trace!("writing {} bytes to {}", data.len(), location.display());
        tokio::fs::write(location, data).await?;
        Ok(())
    }
}
