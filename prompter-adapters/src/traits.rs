//! Shared model client capability and error type.

use std::time::Duration;

use async_trait::async_trait;
use prompter_primitives::Message;
use thiserror::Error;

/// Result alias used by model clients.
pub type ModelResult<T> = Result<T, ModelError>;

/// Error type shared by client implementations.
///
/// Propagated unchanged to the caller; clients never retry on their own.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Client is misconfigured or missing credentials.
    #[error("model client not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// The supplied conversation cannot be sent to the model.
    #[error("invalid completion request: {reason}")]
    InvalidRequest {
        /// Reason describing why the request could not be processed.
        reason: String,
    },

    /// Transport-level failures (network, protocol, timeouts).
    #[error("model transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The provider rejected the request due to rate limiting.
    #[error("model rate limited (retry after {retry_after:?})")]
    RateLimited {
        /// Suggested delay before retrying.
        retry_after: Option<Duration>,
    },

    /// The provider returned an error status or a malformed body.
    #[error("model response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },

    /// A scripted client ran out of replies.
    #[error("scripted client exhausted after {calls} call(s)")]
    Exhausted {
        /// Number of completions served before running dry.
        calls: usize,
    },
}

impl ModelError {
    /// Convenience constructor for invalid requests.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for response failures.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Minimal metadata describing a client instance, used in logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientMetadata {
    provider: &'static str,
    model: String,
}

impl ClientMetadata {
    /// Creates metadata for the supplied provider and model identifier.
    #[must_use]
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns the provider identifier (e.g., "openai").
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Capability implemented by every backing model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Returns basic metadata describing the client instance.
    fn metadata(&self) -> &ClientMetadata;

    /// Completes the conversation.
    ///
    /// `stop` is a generation stop condition: the returned text ends before
    /// it and does not contain it.
    async fn complete(&self, messages: &[Message], stop: Option<&str>) -> ModelResult<String>;
}

/// Rejects conversations a provider cannot complete.
pub(crate) fn ensure_messages(messages: &[Message]) -> ModelResult<()> {
    if messages.is_empty() {
        return Err(ModelError::invalid_request(
            "completion request requires at least one message",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_request_messages() {
        let err = ensure_messages(&[]).expect_err("messages required");
        assert!(matches!(err, ModelError::InvalidRequest { .. }));
        assert!(ensure_messages(&[Message::user("ping")]).is_ok());
    }

    #[test]
    fn metadata_exposes_provider_and_model() {
        let metadata = ClientMetadata::new("openai", "gpt-4o-mini");
        assert_eq!(metadata.provider(), "openai");
        assert_eq!(metadata.model(), "gpt-4o-mini");
    }
}
