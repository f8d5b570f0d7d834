use std::path::PathBuf;

/// Errors that can occur across the chorus pipeline.
///
/// Each variant wraps a specific failure domain so callers can match on
/// the kind of failure instead of string-matching a message. Library
/// crates use this type directly; the binary crate converts to a
/// `miette` diagnostic at the boundary.
///
/// # Examples
///
/// ```
/// use chorus_core::ChorusError;
///
/// let err = ChorusError::Embedding("provider returned 429".into());
/// assert!(err.to_string().contains("429"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ChorusError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Embedding provider call failed or returned a malformed vector.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Vector index creation, upsert, or query failed.
    #[error("store error: {0}")]
    Store(String),

    /// Completion or chat provider call failed.
    #[error("generation error: {0}")]
    Generation(String),

    /// Retrieval produced zero usable matches. A legitimate empty-result
    /// outcome, not a transport error.
    #[error("no relevant context retrieved for the query")]
    NoContext,

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
