//! Core types, configuration, and error handling for the chorus pipeline.
//!
//! This crate provides the shared foundation used by the other chorus crates:
//! - [`ChorusError`] — unified error type using `thiserror`
//! - [`ChorusConfig`] — configuration loaded from `.chorus.toml`
//! - Shared types: [`Chunk`], [`ChunkMatch`], [`Answer`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{
    ChorusConfig, ChunkingConfig, EmbeddingConfig, IndexConfig, LlmConfig, PipelineConfig,
};
pub use error::ChorusError;
pub use types::{Answer, Chunk, ChunkMatch, OutputFormat};

/// A convenience `Result` type for chorus operations.
pub type Result<T> = std::result::Result<T, ChorusError>;
