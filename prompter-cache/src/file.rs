//! Directory-backed cache storing one file per key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::key::is_valid_key;
use crate::{CacheError, CacheResult, CompletionCache};

/// Cache writing each completion to `<root>/<key>`.
///
/// Entries are written to a temporary sibling first and then renamed into
/// place, so readers never observe a partially written completion.
#[derive(Clone, Debug)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Creates a cache rooted at `root`. The directory is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> CacheResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(CacheError::InvalidKey {
                key: key.to_owned(),
            });
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl CompletionCache for FileCache {
    async fn load(&self, key: &str) -> CacheResult<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(completion) => {
                debug!(key, "completion cache hit");
                Ok(Some(completion))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, key: &str, completion: &str) -> CacheResult<()> {
        let path = self.entry_path(key)?;
        fs::create_dir_all(&self.root).await?;

        let staging = self
            .root
            .join(format!(".{key}.{}.tmp", std::process::id()));
        fs::write(&staging, completion).await?;
        if let Err(err) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(err.into());
        }
        debug!(key, path = %path.display(), "completion cached");
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
