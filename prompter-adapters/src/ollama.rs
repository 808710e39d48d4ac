//! `Ollama` client for locally served models.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use hyper::Uri;
use prompter_primitives::{Message, Role};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http_client::{HyperClient, JsonPost, sanitize_base_url, shared_https_client};
use crate::traits::{ClientMetadata, ModelClient, ModelError, ModelResult, ensure_messages};

/// Configuration for the `Ollama` client.
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    base_url: String,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl OllamaConfig {
    /// Creates a configuration for the supplied model using the default local
    /// daemon address.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: "http://127.0.0.1:11434/".to_owned(),
            model: model.into(),
            temperature: None,
            timeout: Duration::from_secs(300),
        }
    }

    /// Overrides the base URL of the Ollama daemon.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> ModelResult<Self> {
        self.base_url = sanitize_base_url("Ollama", base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the HTTP timeout for requests to the daemon.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `Ollama` client that calls the `/api/chat` endpoint.
pub struct OllamaClient {
    client: HyperClient,
    endpoint: Uri,
    metadata: ClientMetadata,
    timeout: Duration,
    temperature: Option<f32>,
}

impl fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaClient")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OllamaClient {
    /// Constructs a client from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] if the endpoint is invalid.
    pub fn new(config: OllamaConfig) -> ModelResult<Self> {
        let endpoint = format!("{}api/chat", config.base_url)
            .parse::<Uri>()
            .map_err(|err| ModelError::configuration(format!("invalid Ollama endpoint: {err}")))?;

        Ok(Self {
            client: shared_https_client(),
            endpoint,
            metadata: ClientMetadata::new("ollama", config.model),
            timeout: config.timeout,
            temperature: config.temperature,
        })
    }

    fn build_request(&self, messages: &[Message], stop: Option<&str>) -> ChatRequest {
        let options = (self.temperature.is_some() || stop.is_some()).then(|| ChatOptions {
            temperature: self.temperature,
            stop: stop.map(|stop| vec![stop.to_owned()]).unwrap_or_default(),
        });

        ChatRequest {
            model: self.metadata.model().to_owned(),
            stream: false,
            messages: messages.iter().map(map_message).collect(),
            options,
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    async fn complete(&self, messages: &[Message], stop: Option<&str>) -> ModelResult<String> {
        ensure_messages(messages)?;
        let payload = self.build_request(messages, stop);
        let body = serde_json::to_vec(&payload).map_err(|err| {
            ModelError::invalid_request(format!("failed to encode Ollama request: {err}"))
        })?;

        debug!(model = self.metadata.model(), messages = messages.len(), "requesting Ollama completion");
        let bytes = JsonPost {
            provider: "Ollama",
            endpoint: &self.endpoint,
            bearer: None,
            timeout: self.timeout,
        }
        .send(&self.client, body)
        .await?;

        let response: ChatResponse = serde_json::from_slice(&bytes).map_err(|err| {
            ModelError::response(format!("failed to decode Ollama response: {err}"))
        })?;

        response_text(response)
    }
}

fn response_text(response: ChatResponse) -> ModelResult<String> {
    if let Some(error) = response.error {
        return Err(ModelError::response(error));
    }

    response
        .message
        .map(|message| message.content)
        .or(response.response)
        .ok_or_else(|| ModelError::response("Ollama response contained no message content"))
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    stream: bool,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Ollama has no developer role; developer instructions travel as `system`.
fn map_message(message: &Message) -> ChatMessage {
    let role = match message.role() {
        Role::Developer => "system",
        role => role.as_str(),
    };
    ChatMessage {
        role: role.to_owned(),
        content: message.content().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_base_url_without_scheme() {
        let err = OllamaConfig::new("gemma")
            .with_base_url("localhost:11434")
            .expect_err("missing scheme should error");
        assert!(matches!(err, ModelError::Configuration { .. }));
    }

    #[test]
    fn developer_role_maps_to_system() {
        assert_eq!(map_message(&Message::developer("rules")).role, "system");
        assert_eq!(map_message(&Message::assistant("hi")).role, "assistant");
    }

    #[test]
    fn stop_travels_in_options() {
        let client = OllamaClient::new(OllamaConfig::new("gemma")).expect("client");

        let without = client.build_request(&[Message::user("hello")], None);
        assert!(without.options.is_none());

        let with = client.build_request(&[Message::user("hello")], Some("[[stop]]"));
        assert_eq!(with.options.unwrap().stop, vec!["[[stop]]".to_owned()]);
    }

    #[test]
    fn chat_response_parsing_prefers_message() {
        let json = r#"{
            "message": {"role": "assistant", "content": "hi"},
            "response": "ignored"
        }"#;

        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response_text(parsed).unwrap(), "hi");
    }

    #[test]
    fn empty_response_is_an_error() {
        let parsed: ChatResponse = serde_json::from_str("{}").unwrap();
        let err = response_text(parsed).expect_err("no content should error");
        assert!(matches!(err, ModelError::Response { .. }));
    }

    #[test]
    fn reported_error_wins() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"error": "model not found", "response": "x"}"#).unwrap();
        let err = response_text(parsed).expect_err("error field should surface");
        assert!(err.to_string().contains("model not found"));
    }
}
