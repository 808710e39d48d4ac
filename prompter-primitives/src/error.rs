//! Shared error definitions for prompt primitives.

use thiserror::Error;

/// Result alias used by constructors that validate their input.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Malformed construction input. Never coerced, always surfaced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The role string is not one of `developer`, `user`, `assistant`.
    #[error("invalid role `{role}`: expected developer, user or assistant")]
    InvalidRole {
        /// The offending role string.
        role: String,
    },

    /// A composite instruction was declared without any items or options.
    #[error("{node} requires at least one item")]
    EmptyItems {
        /// Name of the instruction node being built.
        node: &'static str,
    },

    /// Two sibling items share the same key, which makes extraction ambiguous.
    #[error("duplicate key `{key}` in {node}")]
    DuplicateKey {
        /// Name of the instruction node being built.
        node: &'static str,
        /// The repeated key.
        key: String,
    },

    /// A key collides with a marker reserved by the protocol.
    #[error("key `{key}` is reserved")]
    ReservedKey {
        /// The reserved key.
        key: String,
    },

    /// Summarization thresholds violate `0 < include_size <= start_size`.
    #[error("invalid summary thresholds: start_size={start_size}, include_size={include_size}")]
    InvalidThresholds {
        /// Length at which summarization starts.
        start_size: usize,
        /// Length of history folded into the summary.
        include_size: usize,
    },
}
