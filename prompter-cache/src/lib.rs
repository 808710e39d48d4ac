//! Completion cache keyed by a digest of the conversation.
//!
//! A cache maps the exact message sequence sent to a model onto the completion
//! it produced, so replaying a conversation against a deterministic client
//! never pays for the same request twice.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod file;
mod key;
mod memory;

use async_trait::async_trait;

pub use error::{CacheError, CacheResult};
pub use file::FileCache;
pub use key::cache_key;
pub use memory::MemoryCache;

/// Storage for completed model replies.
#[async_trait]
pub trait CompletionCache: Send + Sync {
    /// Returns the completion stored under `key`, if any.
    async fn load(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `completion` under `key`, replacing any previous entry.
    async fn save(&self, key: &str, completion: &str) -> CacheResult<()>;

    /// Removes every entry.
    async fn clear(&self) -> CacheResult<()>;
}
