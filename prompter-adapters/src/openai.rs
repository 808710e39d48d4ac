//! `OpenAI` chat completions client.

use std::{env, fmt, time::Duration};

use async_trait::async_trait;
use hyper::Uri;
use prompter_primitives::Message;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http_client::{HyperClient, JsonPost, sanitize_base_url, shared_https_client};
use crate::traits::{ClientMetadata, ModelClient, ModelError, ModelResult, ensure_messages};

/// Environment variable used when loading configuration automatically.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the `OpenAI` client.
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiConfig {
    /// Creates a configuration using the supplied model identifier.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: "https://api.openai.com/".to_owned(),
            timeout: Duration::from_secs(120),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Loads the API key from the `OPENAI_API_KEY` environment variable.
    #[must_use]
    pub fn from_env(model: impl Into<String>) -> Self {
        let mut cfg = Self::new(model);
        cfg.api_key = env::var(OPENAI_API_KEY_ENV).ok();
        cfg
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> ModelResult<Self> {
        self.base_url = sanitize_base_url("OpenAI", base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the sampling temperature. Deterministic replies (`0.0`) make the
    /// completion cache sound.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Caps the number of generated tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supplies an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// `OpenAI` client calling the chat completions API over HTTPS.
pub struct OpenAiClient {
    client: HyperClient,
    endpoint: Uri,
    metadata: ClientMetadata,
    api_key: String,
    timeout: Duration,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Constructs a client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if the API key is missing or the
    /// endpoint is invalid.
    pub fn new(config: OpenAiConfig) -> ModelResult<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| ModelError::configuration("OpenAI client requires an API key"))?;

        let endpoint = format!("{}v1/chat/completions", config.base_url)
            .parse::<Uri>()
            .map_err(|err| ModelError::configuration(format!("invalid OpenAI endpoint: {err}")))?;

        Ok(Self {
            client: shared_https_client(),
            endpoint,
            metadata: ClientMetadata::new("openai", config.model),
            api_key,
            timeout: config.timeout,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn build_request(&self, messages: &[Message], stop: Option<&str>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.metadata.model().to_owned(),
            messages: messages.iter().map(map_message).collect(),
            stop: stop.map(str::to_owned),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    async fn complete(&self, messages: &[Message], stop: Option<&str>) -> ModelResult<String> {
        ensure_messages(messages)?;
        let payload = self.build_request(messages, stop);
        let body = serde_json::to_vec(&payload).map_err(|err| {
            ModelError::invalid_request(format!("failed to encode OpenAI request: {err}"))
        })?;

        debug!(model = self.metadata.model(), messages = messages.len(), "requesting OpenAI completion");
        let bytes = JsonPost {
            provider: "OpenAI",
            endpoint: &self.endpoint,
            bearer: Some(&self.api_key),
            timeout: self.timeout,
        }
        .send(&self.client, body)
        .await?;

        let response: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|err| {
            ModelError::response(format!("failed to decode OpenAI response: {err}"))
        })?;

        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.and_then(|message| message.content))
            .ok_or_else(|| ModelError::response("OpenAI response contained no message content"))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn map_message(message: &Message) -> OpenAiMessage {
    OpenAiMessage {
        role: message.role().as_str(),
        content: message.content().to_owned(),
    }
}
