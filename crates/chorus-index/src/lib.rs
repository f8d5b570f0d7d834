//! Chunking, embedding, and vector-index access for the chorus pipeline.
//!
//! Data flows strictly downward: raw text → chunks ([`chunker`]) →
//! embedding vectors ([`embedding`]) → stored records ([`store`]);
//! query text → query embedding → ranked matches ([`retrieval`]).

pub mod chunker;
pub mod embedding;
pub mod retrieval;
pub mod store;

#[cfg(test)]
pub(crate) mod test_util;
