//! The conversation controller.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use prompter_adapters::ModelClient;
use prompter_cache::{CompletionCache, FileCache, cache_key};
use prompter_instructions::{Terminable, Value, stop_marker};
use prompter_primitives::{Message, Role};
use prompter_telemetry::{LogEvent, Logger};
use tracing::debug;

use crate::{Interaction, PromptError, PromptResult, PrompterConfig, SummaryThresholds};

/// Owns a conversation and drives completions against a model client.
///
/// Every appended message is reported to the logger. When summarization
/// thresholds are set, the oldest part of the conversation is folded into a
/// summary as soon as the aggregate length reaches the start size.
pub struct Prompter {
    client: Arc<dyn ModelClient>,
    messages: Vec<Message>,
    cache: Option<Arc<dyn CompletionCache>>,
    logger: Option<Arc<dyn Logger>>,
    interaction: Option<Arc<dyn Interaction>>,
    thresholds: Option<SummaryThresholds>,
    tag: Option<String>,
}

impl fmt::Debug for Prompter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metadata = self.client.metadata();
        f.debug_struct("Prompter")
            .field("provider", &metadata.provider())
            .field("model", &metadata.model())
            .field("messages", &self.messages.len())
            .field("cache_configured", &self.cache.is_some())
            .field("logger_configured", &self.logger.is_some())
            .field("interaction_configured", &self.interaction.is_some())
            .field("thresholds", &self.thresholds)
            .field("tag", &self.tag)
            .finish()
    }
}

impl Prompter {
    /// Starts building a prompter around `client`.
    #[must_use]
    pub fn builder(client: Arc<dyn ModelClient>) -> PrompterBuilder {
        PrompterBuilder::new(client)
    }

    /// Creates a prompter with no cache, logger, interaction or summarization.
    #[must_use]
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self::builder(client).build()
    }

    /// Messages in conversation order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Aggregate content length of the conversation, in characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        Message::total_len(&self.messages)
    }

    /// Tag attached to logged messages.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Summarization thresholds, if enabled.
    #[must_use]
    pub const fn thresholds(&self) -> Option<SummaryThresholds> {
        self.thresholds
    }

    /// The model client completions are requested from.
    #[must_use]
    pub fn client(&self) -> &Arc<dyn ModelClient> {
        &self.client
    }

    /// Removes every message without logging.
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Cache key of the current conversation.
    #[must_use]
    pub fn cache_key(&self) -> String {
        cache_key(&self.messages)
    }

    /// Returns an independent controller sharing this one's client, cache,
    /// logger, interaction and thresholds, with a copy of the messages and no
    /// tag.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            messages: self.messages.clone(),
            cache: self.cache.clone(),
            logger: self.logger.clone(),
            interaction: self.interaction.clone(),
            thresholds: self.thresholds,
            tag: None,
        }
    }

    /// Appends a message, logs it, and summarizes when the conversation has
    /// grown past the start size.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Summary`] when the summarized conversation is
    /// still at or above the start size, and propagates failures of the
    /// summarization request itself.
    pub async fn append_message(
        &mut self,
        content: impl Into<String>,
        role: Role,
    ) -> PromptResult<()> {
        self.messages.push(Message::new(role, content));
        if let (Some(logger), Some(message)) = (&self.logger, self.messages.last()) {
            logger.log(&LogEvent::new(
                message,
                self.messages.len() - 1,
                self.tag.as_deref(),
            ));
        }

        let Some(thresholds) = self.thresholds else {
            return Ok(());
        };
        if self.len_chars() < thresholds.start_size() {
            return Ok(());
        }

        self.summarize(thresholds).await?;
        let length = self.len_chars();
        if length >= thresholds.start_size() {
            return Err(PromptError::Summary {
                length,
                start_size: thresholds.start_size(),
            });
        }
        Ok(())
    }

    /// Runs the interaction hook, obtains a completion (from the cache when
    /// possible) and appends it as an assistant message.
    ///
    /// When `stop` is given the model stops generating before it, and the
    /// marker text is restored at the end of the completion so marker-based
    /// extraction still finds it.
    ///
    /// # Errors
    ///
    /// Propagates interaction, cache, model and summarization failures.
    pub async fn request_completion(&mut self, stop: Option<&str>) -> PromptResult<()> {
        self.next_completion(stop).await.map(drop)
    }

    /// Requests a completion and returns the text preceding `stop`.
    ///
    /// # Errors
    ///
    /// See [`request_completion`](Self::request_completion).
    pub async fn get_completion(&mut self, stop: Option<&str>) -> PromptResult<String> {
        let mut completion = self.next_completion(stop).await?;
        if let Some(index) = stop.and_then(|stop| completion.find(stop)) {
            completion.truncate(index);
        }
        Ok(completion)
    }

    /// Asks for a reply formatted by `instruction` and extracts its value.
    ///
    /// The instruction is terminated with a `[[stop]]` item, its description is
    /// appended with `role`, and the completion is requested with the stop
    /// marker as the stop condition.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Extraction`] when the reply does not follow the
    /// format, or any error raised by [`request_completion`](Self::request_completion).
    pub async fn get_structured_reply(
        &mut self,
        instruction: &dyn Terminable,
        role: Role,
    ) -> PromptResult<Value> {
        let terminated = instruction.terminated();
        self.append_message(terminated.describe(), role).await?;

        let stop = stop_marker();
        let completion = self.next_completion(Some(stop.as_str())).await?;
        Ok(terminated.extract(&completion)?)
    }

    /// Returns the appended completion, which summarization may already have
    /// folded out of the conversation.
    async fn next_completion(&mut self, stop: Option<&str>) -> PromptResult<String> {
        if let Some(interaction) = self.interaction.clone() {
            interaction.interact(self).await?;
        }

        let completion = self.fetch_completion(stop).await?;
        self.append_message(completion.clone(), Role::Assistant).await?;
        Ok(completion)
    }

    async fn fetch_completion(&self, stop: Option<&str>) -> PromptResult<String> {
        let Some(cache) = &self.cache else {
            return self.complete(stop).await;
        };

        let key = self.cache_key();
        if let Some(completion) = cache.load(&key).await? {
            debug!(key = %key, tag = self.tag(), "reusing cached completion");
            return Ok(completion);
        }

        let completion = self.complete(stop).await?;
        cache.save(&key, &completion).await?;
        Ok(completion)
    }

    async fn complete(&self, stop: Option<&str>) -> PromptResult<String> {
        let metadata = self.client.metadata();
        debug!(
            provider = metadata.provider(),
            model = metadata.model(),
            messages = self.messages.len(),
            tag = self.tag(),
            "requesting completion"
        );
        let mut completion = self.client.complete(&self.messages, stop).await?;
        if let Some(stop) = stop {
            completion.push_str(stop);
        }
        Ok(completion)
    }

    pub(crate) fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub(crate) fn disable_summary(&mut self) {
        self.thresholds = None;
    }

    pub(crate) fn disable_interaction(&mut self) {
        self.interaction = None;
    }
}

/// Builder for [`Prompter`].
pub struct PrompterBuilder {
    client: Arc<dyn ModelClient>,
    messages: Vec<Message>,
    cache: Option<Arc<dyn CompletionCache>>,
    logger: Option<Arc<dyn Logger>>,
    interaction: Option<Arc<dyn Interaction>>,
    thresholds: Option<SummaryThresholds>,
    tag: Option<String>,
}

impl fmt::Debug for PrompterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrompterBuilder")
            .field("messages", &self.messages.len())
            .field("thresholds", &self.thresholds)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl PrompterBuilder {
    /// Creates a builder for a prompter backed by `client`.
    #[must_use]
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            messages: Vec::new(),
            cache: None,
            logger: None,
            interaction: None,
            thresholds: None,
            tag: None,
        }
    }

    /// Stores completions in `cache`.
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn CompletionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Stores completions as files under `dir`.
    #[must_use]
    pub fn cache_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.cache(Arc::new(FileCache::new(dir)))
    }

    /// Reports appended messages to `logger`.
    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Runs `interaction` before every completion request.
    #[must_use]
    pub fn interaction(mut self, interaction: Arc<dyn Interaction>) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Enables automatic summarization.
    #[must_use]
    pub fn summary(mut self, thresholds: SummaryThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Tags logged messages.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Seeds the conversation. Seeded messages are not logged.
    #[must_use]
    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages = messages.into_iter().collect();
        self
    }

    /// Applies every setting present in `config`.
    #[must_use]
    pub fn config(mut self, config: &PrompterConfig) -> Self {
        if let Some(dir) = &config.cache_dir {
            self = self.cache_dir(dir.clone());
        }
        if let Some(thresholds) = config.summary {
            self.thresholds = Some(thresholds);
        }
        if let Some(tag) = &config.tag {
            self.tag = Some(tag.clone());
        }
        self
    }

    /// Finishes the prompter.
    #[must_use]
    pub fn build(self) -> Prompter {
        Prompter {
            client: self.client,
            messages: self.messages,
            cache: self.cache,
            logger: self.logger,
            interaction: self.interaction,
            thresholds: self.thresholds,
            tag: self.tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompter_adapters::scripted::ScriptedClient;
    use prompter_cache::MemoryCache;
    use prompter_instructions::{Data, Item, List};

    fn scripted(replies: &[&str]) -> Arc<ScriptedClient> {
        Arc::new(ScriptedClient::new(replies.iter().copied()))
    }

    #[tokio::test]
    async fn completion_restores_stop_marker() {
        let client = scripted(&["hello"]);
        let mut prompter = Prompter::new(client.clone());
        prompter.append_message("hi", Role::User).await.unwrap();

        let text = prompter.get_completion(Some("[[stop]]")).await.unwrap();
        assert_eq!(text, "hello");
        assert_eq!(prompter.messages()[1].content(), "hello[[stop]]");
        assert_eq!(prompter.messages()[1].role(), Role::Assistant);
        assert_eq!(client.requests()[0].stop.as_deref(), Some("[[stop]]"));
    }

    #[tokio::test]
    async fn structured_reply_appends_terminated_description() {
        let client = scripted(&["reasoning here[[answer]] 42 "]);
        let mut prompter = Prompter::new(client.clone());
        let list = List::new(
            "Solve the task",
            [Item::new("reasoning"), Item::with("answer", Data::text("The answer"))],
        )
        .unwrap();

        let value = prompter.get_structured_reply(&list, Role::User).await.unwrap();
        assert_eq!(value, Value::List(vec!["reasoning here".into(), "42".into()]));

        let sent = &client.requests()[0];
        assert!(sent.messages[0].content().contains("[[stop]]"));
        assert_eq!(sent.stop.as_deref(), Some("[[stop]]"));
    }

    #[tokio::test]
    async fn cached_completion_skips_client() {
        let cache: Arc<MemoryCache> = Arc::new(MemoryCache::new());
        let first = scripted(&["cached reply"]);
        let mut prompter = Prompter::builder(first.clone()).cache(cache.clone()).build();
        prompter.append_message("question", Role::User).await.unwrap();
        prompter.request_completion(None).await.unwrap();

        let second = scripted(&[]);
        let mut replay = Prompter::builder(second.clone()).cache(cache).build();
        replay.append_message("question", Role::User).await.unwrap();
        let text = replay.get_completion(None).await.unwrap();

        assert_eq!(text, "cached reply");
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn fork_is_independent_and_untagged() {
        let mut prompter = Prompter::builder(scripted(&[]))
            .tag("main")
            .messages([Message::developer("rules")])
            .build();
        let mut fork = prompter.fork();
        fork.append_message("only in fork", Role::User).await.unwrap();
        prompter.append_message("only in main", Role::User).await.unwrap();

        assert_eq!(fork.tag(), None);
        assert_eq!(prompter.tag(), Some("main"));
        assert_eq!(fork.messages()[1].content(), "only in fork");
        assert_eq!(prompter.messages()[1].content(), "only in main");
        assert_eq!(prompter.messages().len(), 2);
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let mut prompter = Prompter::new(scripted(&[]));
        prompter.append_message("hi", Role::User).await.unwrap();
        let err = prompter.request_completion(None).await.unwrap_err();
        assert!(matches!(err, PromptError::Model(_)));
        assert_eq!(prompter.messages().len(), 1);
    }

    #[test]
    fn config_applies_settings() {
        let config = PrompterConfig {
            cache_dir: None,
            summary: Some(SummaryThresholds::new(10, 5).unwrap()),
            tag: Some("cfg".to_owned()),
        };
        let prompter = Prompter::builder(scripted(&[])).config(&config).build();
        assert_eq!(prompter.tag(), Some("cfg"));
        assert_eq!(prompter.thresholds().map(SummaryThresholds::start_size), Some(10));
    }
}
