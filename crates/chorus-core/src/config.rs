use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ChorusError;

/// Top-level configuration loaded from `.chorus.toml`.
///
/// Resolution is layered: CLI `--config` path > local `.chorus.toml` >
/// built-in defaults. Every numeric limit the pipeline uses (chunk sizes,
/// metadata bound, vector dimensions, `top_k`) lives here rather than as
/// a hard-coded constant.
///
/// # Examples
///
/// ```
/// use chorus_core::ChorusConfig;
///
/// let config = ChorusConfig::default();
/// assert_eq!(config.chunking.max_chunk_size, 500);
/// assert_eq!(config.index.top_k, 5);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChorusConfig {
    /// Embedding provider settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Remote vector index settings.
    #[serde(default)]
    pub index: IndexConfig,
    /// Source chunking settings.
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Chat / completion provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Batch pipeline input and output paths.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ChorusConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::FileNotFound`] if `path` does not exist,
    /// [`ChorusError::Io`] if the file cannot be read, or
    /// [`ChorusError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chorus_core::ChorusConfig;
    /// use std::path::Path;
    ///
    /// let config = ChorusConfig::from_file(Path::new(".chorus.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ChorusError> {
        if !path.exists() {
            return Err(ChorusError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use chorus_core::ChorusConfig;
    ///
    /// let toml = r#"
    /// [chunking]
    /// max_chunk_size = 800
    /// "#;
    /// let config = ChorusConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.chunking.max_chunk_size, 800);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ChorusError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Embedding provider configuration.
///
/// # Examples
///
/// ```
/// use chorus_core::EmbeddingConfig;
///
/// let config = EmbeddingConfig::default();
/// assert_eq!(config.model, "text-embedding-3-small");
/// assert_eq!(config.dimensions, 1536);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name (default: `"openai"`). Any OpenAI-compatible
    /// `/v1/embeddings` endpoint works via `base_url`.
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    /// API key for the embedding provider.
    pub api_key: Option<String>,
    /// Model identifier (default: `"text-embedding-3-small"`).
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Expected vector dimensions (default: 1536). Responses with a
    /// different dimension are rejected.
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
    /// Maximum characters per embedding request; longer text is sliced
    /// before embedding (default: 4000).
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_embedding_provider() -> String {
    "openai".into()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_max_input_chars() -> usize {
    4000
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_key: None,
            model: default_embedding_model(),
            base_url: None,
            dimensions: default_embedding_dimensions(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// Remote vector index configuration.
///
/// # Examples
///
/// ```
/// use chorus_core::IndexConfig;
///
/// let config = IndexConfig::default();
/// assert_eq!(config.name, "code-embeddings");
/// assert_eq!(config.metric, "euclidean");
/// assert_eq!(config.max_metadata_chars, 4000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index name (default: `"code-embeddings"`).
    #[serde(default = "default_index_name")]
    pub name: String,
    /// Similarity metric the index is created with (default:
    /// `"euclidean"`; `"cosine"` and `"dotproduct"` are also valid).
    #[serde(default = "default_metric")]
    pub metric: String,
    /// Cloud provider for serverless index creation (default: `"aws"`).
    #[serde(default = "default_cloud")]
    pub cloud: String,
    /// Deployment region (default: `"us-east-1"`).
    #[serde(default = "default_region")]
    pub region: String,
    /// API key for the index service.
    pub api_key: Option<String>,
    /// Control-plane base URL override (for self-hosted or test servers).
    pub base_url: Option<String>,
    /// Data-plane host for upsert/query. When unset, the host reported by
    /// the control plane at index creation is used.
    pub host: Option<String>,
    /// Number of matches to retrieve per query (default: 5).
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Maximum characters of chunk text stored as metadata; longer chunk
    /// text is truncated before upsert (default: 4000).
    #[serde(default = "default_max_metadata_chars")]
    pub max_metadata_chars: usize,
}

fn default_index_name() -> String {
    "code-embeddings".into()
}

fn default_metric() -> String {
    "euclidean".into()
}

fn default_cloud() -> String {
    "aws".into()
}

fn default_region() -> String {
    "us-east-1".into()
}

fn default_top_k() -> usize {
    5
}

fn default_max_metadata_chars() -> usize {
    4000
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            metric: default_metric(),
            cloud: default_cloud(),
            region: default_region(),
            api_key: None,
            base_url: None,
            host: None,
            top_k: default_top_k(),
            max_metadata_chars: default_max_metadata_chars(),
        }
    }
}

/// Source chunking configuration.
///
/// # Examples
///
/// ```
/// use chorus_core::ChunkingConfig;
///
/// let config = ChunkingConfig::default();
/// assert_eq!(config.max_chunk_size, 500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum joined length of a line-oriented chunk (default: 500).
    /// Best-effort: a single line longer than this still forms one chunk.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

fn default_max_chunk_size() -> usize {
    500
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

/// Chat / completion provider configuration.
///
/// # Examples
///
/// ```
/// use chorus_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4o-mini");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (default: `"openai"`).
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    /// Model identifier (default: `"gpt-4o-mini"`).
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Maximum tokens per generated response. `None` leaves the budget to
    /// the provider.
    pub max_tokens: Option<usize>,
}

fn default_llm_provider() -> String {
    "openai".into()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_key: None,
            base_url: None,
            max_tokens: None,
        }
    }
}

/// Batch pipeline input and output paths.
///
/// # Examples
///
/// ```
/// use chorus_core::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.source_path, "processed_code_output.txt");
/// assert_eq!(config.artifact_path, "gpt_response.md");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source text file ingested by the batch flow.
    #[serde(default = "default_source_path")]
    pub source_path: String,
    /// File the answer artifact is written to.
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,
}

fn default_source_path() -> String {
    "processed_code_output.txt".into()
}

fn default_artifact_path() -> String {
    "gpt_response.md".into()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            artifact_path: default_artifact_path(),
        }
    }
}
