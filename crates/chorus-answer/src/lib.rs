//! Grounded answer generation over retrieved code chunks.
//!
//! Provides the generation half of the pipeline: LLM client, prompt
//! construction, the two generation modes (per-chunk explanation and
//! grounded question answering), and the answer artifact on disk.

pub mod artifact;
pub mod generate;
pub mod llm;
pub mod prompt;
