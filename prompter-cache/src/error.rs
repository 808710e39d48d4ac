//! Error types for completion caches.

use thiserror::Error;

/// Errors emitted by cache backends.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Underlying I/O failure while reading or writing cache entries.
    #[error("cache i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
    /// A key that is not a lowercase hex digest was used.
    #[error("invalid cache key `{key}`")]
    InvalidKey {
        /// Offending key.
        key: String,
    },
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
