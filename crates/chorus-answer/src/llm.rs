use std::time::Duration;

use chorus_core::{ChorusError, LlmConfig};
use serde::{Deserialize, Serialize};

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use chorus_answer::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Explain this code".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use chorus_answer::llm::Role;
///
/// let role = Role::System;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"system\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes the `/v1/chat/completions`
/// endpoint: OpenAI, Ollama, vLLM, LiteLLM, etc.
///
/// # Examples
///
/// ```
/// use chorus_core::LlmConfig;
/// use chorus_answer::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Create a new LLM client from configuration.
    ///
    /// Falls back to the `OPENAI_API_KEY` env var if no key in config.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Generation`] if the HTTP client cannot be
    /// built, or [`ChorusError::Config`] if no API key is available.
    pub fn new(config: &LlmConfig) -> Result<Self, ChorusError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ChorusError::Generation(format!("failed to create HTTP client: {e}")))?;

        let mut config = config.clone();
        if config.api_key.is_none() {
            config.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if config.api_key.is_none() {
            return Err(ChorusError::Config(
                "LLM API key not found: set llm.api_key in .chorus.toml or OPENAI_API_KEY env var"
                    .into(),
            ));
        }

        Ok(Self { client, config })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a chat completion request and return the text response.
    ///
    /// Builds a request to `{base_url}/v1/chat/completions` with the
    /// given messages and temperature 0.7. `max_tokens` is sent only
    /// when configured; otherwise the provider's budget applies.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Generation`] on HTTP errors or response
    /// parsing failures.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, ChorusError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com");
        let url = format!("{base_url}/v1/chat/completions");

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": 0.7,
        });
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }
        request = request.header("Content-Type", "application/json");

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| ChorusError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ChorusError::Generation(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChorusError::Generation(format!("failed to parse response: {e}")))?;

        let content = response_body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                ChorusError::Generation(format!("unexpected response structure: {response_body}"))
            })?;

        Ok(content.to_string())
    }

    /// Send a single user message and return the text response.
    pub async fn complete(&self, prompt: &str) -> Result<String, ChorusError> {
        self.chat(vec![ChatMessage {
            role: Role::User,
            content: prompt.to_string(),
        }])
        .await
    }
}
