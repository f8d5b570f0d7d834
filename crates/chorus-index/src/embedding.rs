//! Embedding provider client.
//!
//! Wraps an OpenAI-compatible `/v1/embeddings` endpoint. Long input is
//! fixed-width sliced before embedding so a single oversized text never
//! exceeds the provider's input limit; one vector comes back per slice,
//! in slice order.

use chorus_core::{ChorusError, EmbeddingConfig};
use serde::{Deserialize, Serialize};

use crate::chunker::split_fixed;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for an OpenAI-compatible embedding API.
///
/// # Examples
///
/// ```
/// use chorus_index::embedding::EmbeddingClient;
///
/// let client = EmbeddingClient::new("test-key");
/// assert_eq!(client.model(), "text-embedding-3-small");
/// ```
pub struct EmbeddingClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    max_input_chars: usize,
}

impl std::fmt::Debug for EmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedDataItem>,
}

#[derive(Deserialize)]
struct EmbedDataItem {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    /// Create a new client with the given API key and default settings.
    pub fn new(api_key: &str) -> Self {
        let defaults = EmbeddingConfig::default();
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: defaults.model,
            dimensions: defaults.dimensions,
            max_input_chars: defaults.max_input_chars,
        }
    }

    /// Create a client from an [`EmbeddingConfig`].
    ///
    /// Falls back to the `OPENAI_API_KEY` env var if no key in config.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Config`] if no API key is available.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chorus_core::EmbeddingConfig;
    /// use chorus_index::embedding::EmbeddingClient;
    ///
    /// let config = EmbeddingConfig::default();
    /// let client = EmbeddingClient::with_config(&config).unwrap();
    /// ```
    pub fn with_config(config: &EmbeddingConfig) -> Result<Self, ChorusError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                ChorusError::Config(
                    "embedding API key not found: set embedding.api_key in .chorus.toml or OPENAI_API_KEY env var".into(),
                )
            })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            dimensions: config.dimensions,
            max_input_chars: config.max_input_chars,
        })
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the expected vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a text, returning one vector per input slice in slice order.
    ///
    /// The text is fixed-width sliced to `max_input_chars` first; the
    /// provider is called once per slice. Fails fast: an error on any
    /// slice fails the whole call with the slice index attached, and no
    /// partial results are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Embedding`] if any provider call fails or
    /// returns a vector whose dimension differs from the configured one.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chorus_index::embedding::EmbeddingClient;
    ///
    /// # async fn example() {
    /// let client = EmbeddingClient::new("key");
    /// let vectors = client.embed("fn main() {}").await.unwrap();
    /// assert_eq!(vectors.len(), 1);
    /// # }
    /// ```
    pub async fn embed(&self, text: &str) -> Result<Vec<Vec<f32>>, ChorusError> {
        let slices = split_fixed(text, self.max_input_chars);
        let mut vectors = Vec::with_capacity(slices.len());

        for (i, slice) in slices.iter().enumerate() {
            let vector = self
                .embed_slice(slice)
                .await
                .map_err(|e| ChorusError::Embedding(format!("slice {i}: {e}")))?;
            vectors.push(vector);
        }

        Ok(vectors)
    }

    /// Embed a short text and return its single vector.
    ///
    /// Convenience for callers needing "the" embedding of a query or a
    /// chunk: the first vector of [`embed`](Self::embed).
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Embedding`] if the provider call fails or
    /// the text is empty.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ChorusError> {
        let mut vectors = self.embed(text).await?;
        if vectors.is_empty() {
            return Err(ChorusError::Embedding("cannot embed empty text".into()));
        }
        Ok(vectors.remove(0))
    }

    async fn embed_slice(&self, slice: &str) -> Result<Vec<f32>, ChorusError> {
        let request = EmbedRequest {
            model: self.model.clone(),
            input: vec![slice.to_string()],
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ChorusError::Embedding(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".into());
            return Err(ChorusError::Embedding(format!(
                "embedding API returned {status}: {body}"
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ChorusError::Embedding(format!("failed to parse response: {e}")))?;

        let first = embed_response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ChorusError::Embedding("empty response from embedding API".into()))?;

        if first.embedding.len() != self.dimensions {
            return Err(ChorusError::Embedding(format!(
                "provider returned a {}-dimension vector, expected {}",
                first.embedding.len(),
                self.dimensions,
            )));
        }

        Ok(first.embedding)
    }

    /// Build the JSON request body for an embed call (for testing).
    #[cfg(test)]
    fn build_request(&self, texts: &[String]) -> EmbedRequest {
        EmbedRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        }
    }
}
