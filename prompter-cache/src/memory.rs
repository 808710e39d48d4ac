//! In-process cache for tests and short-lived sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{CacheResult, CompletionCache};

/// Cache holding completions in a map guarded by an async lock.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored completions.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` when nothing has been cached yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CompletionCache for MemoryCache {
    async fn load(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, completion: &str) -> CacheResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), completion.to_owned());
        Ok(())
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_clears() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty().await);

        cache.save("ab", "one").await.unwrap();
        cache.save("ab", "two").await.unwrap();
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.load("ab").await.unwrap().as_deref(), Some("two"));

        cache.clear().await.unwrap();
        assert_eq!(cache.load("ab").await.unwrap(), None);
    }
}
