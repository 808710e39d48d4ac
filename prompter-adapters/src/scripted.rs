//! Deterministic client that replays queued replies.
//!
//! Useful for tests and offline demos: every request is recorded so callers
//! can assert on exactly what the prompter sent.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use prompter_primitives::Message;

use crate::traits::{ClientMetadata, ModelClient, ModelError, ModelResult};

/// A request observed by a [`ScriptedClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Conversation sent to the client.
    pub messages: Vec<Message>,
    /// Stop condition, if any.
    pub stop: Option<String>,
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<ModelResult<String>>,
    repeat: Option<String>,
    requests: Vec<RecordedRequest>,
}

/// Client returning scripted replies in order.
///
/// Once the queue is empty it keeps returning the repeating reply if one was
/// configured, otherwise [`ModelError::Exhausted`].
#[derive(Debug)]
pub struct ScriptedClient {
    metadata: ClientMetadata,
    script: Mutex<Script>,
}

impl ScriptedClient {
    /// Creates a client that returns `replies` in order.
    #[must_use]
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metadata: ClientMetadata::new("scripted", "scripted"),
            script: Mutex::new(Script {
                replies: replies.into_iter().map(|reply| Ok(reply.into())).collect(),
                ..Script::default()
            }),
        }
    }

    /// Creates a client that answers every request with `reply`.
    #[must_use]
    pub fn repeating(reply: impl Into<String>) -> Self {
        let client = Self::new(Vec::<String>::new());
        client.lock().repeat = Some(reply.into());
        client
    }

    /// Queues a failure after the replies queued so far.
    #[must_use]
    pub fn then_fail(self, error: ModelError) -> Self {
        self.lock().replies.push_back(Err(error));
        self
    }

    /// Queues another reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock().replies.push_back(Ok(reply.into()));
    }

    /// Returns every request observed so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of completions requested so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    async fn complete(&self, messages: &[Message], stop: Option<&str>) -> ModelResult<String> {
        let mut script = self.lock();
        script.requests.push(RecordedRequest {
            messages: messages.to_vec(),
            stop: stop.map(str::to_owned),
        });
        match script.replies.pop_front() {
            Some(reply) => reply,
            None => script.repeat.clone().ok_or(ModelError::Exhausted {
                calls: script.requests.len() - 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_replies_then_exhausts() {
        let client = ScriptedClient::new(["one", "two"]);
        let messages = [Message::user("hi")];

        assert_eq!(client.complete(&messages, None).await.unwrap(), "one");
        assert_eq!(client.complete(&messages, Some("[[stop]]")).await.unwrap(), "two");
        let err = client.complete(&messages, None).await.unwrap_err();
        assert!(matches!(err, ModelError::Exhausted { calls: 2 }));

        let requests = client.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].stop.as_deref(), Some("[[stop]]"));
        assert_eq!(requests[0].messages, messages.to_vec());
    }

    #[tokio::test]
    async fn repeating_client_never_exhausts() {
        let client = ScriptedClient::repeating("same");
        for _ in 0..3 {
            assert_eq!(client.complete(&[Message::user("x")], None).await.unwrap(), "same");
        }
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn queued_failure_is_returned() {
        let client = ScriptedClient::new(["ok"]).then_fail(ModelError::transport("down"));
        assert!(client.complete(&[Message::user("x")], None).await.is_ok());
        let err = client.complete(&[Message::user("x")], None).await.unwrap_err();
        assert!(matches!(err, ModelError::Transport { .. }));
    }
}
