//! Error type surfaced by the conversation controller.

use prompter_adapters::ModelError;
use prompter_cache::CacheError;
use prompter_instructions::ExtractionError;
use prompter_primitives::ValidationError;
use thiserror::Error;

/// Result alias used by [`Prompter`](crate::Prompter) operations.
pub type PromptResult<T> = Result<T, PromptError>;

/// Errors raised while driving a conversation.
///
/// Lower layers never swallow failures; everything reaches the caller of the
/// operation that triggered it.
#[derive(Debug, Error)]
pub enum PromptError {
    /// An input was rejected at construction time.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The model reply did not follow the requested format.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The model client failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The completion cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Summarization could not bring the conversation under the threshold.
    #[error(
        "summarized conversation is still {length} characters long (threshold {start_size})"
    )]
    Summary {
        /// Aggregate content length after summarizing.
        length: usize,
        /// Threshold that triggered summarization.
        start_size: usize,
    },

    /// The user asked to end the session from an interaction hook.
    #[error("session aborted by user")]
    Aborted,

    /// Configuration could not be loaded.
    #[error("invalid prompter configuration: {reason}")]
    Config {
        /// Description of the problem.
        reason: String,
    },

    /// Terminal or file I/O failed.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
}

impl PromptError {
    /// Convenience constructor for configuration errors.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns `true` when the error is an intentional user exit.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
