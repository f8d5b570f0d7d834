//! Ingestion and retrieval over the embedding client and vector store.
//!
//! Ingestion is best-effort: the index is cleared, then chunks are
//! upserted in source order and a failing chunk is logged and skipped.
//! Retrieval is fail-fast: a query-time error propagates to the caller.

use chorus_core::{ChorusError, Chunk, ChunkMatch};
use serde::Serialize;

use crate::embedding::EmbeddingClient;
use crate::store::VectorStore;

/// Outcome of an ingestion run.
///
/// # Examples
///
/// ```
/// use chorus_index::retrieval::IngestStats;
///
/// let stats = IngestStats { upserted: 9, failed: 1 };
/// assert_eq!(stats.upserted + stats.failed, 10);
/// ```
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IngestStats {
    /// Chunks embedded and upserted successfully.
    pub upserted: usize,
    /// Chunks skipped after a logged embedding or upsert failure.
    pub failed: usize,
}

/// Retrieval service: embeds queries and chunks, talks to the store.
pub struct Retriever {
    embedding: EmbeddingClient,
    store: VectorStore,
    max_metadata_chars: usize,
}

impl Retriever {
    /// Create a retriever from its two collaborators.
    ///
    /// `max_metadata_chars` bounds the chunk text stored as record
    /// metadata; longer chunks are stored truncated (the embedding is
    /// always computed from the untruncated text).
    pub fn new(embedding: EmbeddingClient, store: VectorStore, max_metadata_chars: usize) -> Self {
        Self {
            embedding,
            store,
            max_metadata_chars,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Ingest chunks into the vector index.
    ///
    /// Clears the index first so positional ids from a previous run can
    /// never survive alongside fresh ones, then for each chunk in source
    /// order: embed the untruncated text, take the first vector, and
    /// upsert it with the truncated text as metadata. A chunk that fails
    /// to embed or upsert is logged and skipped; the run continues and
    /// partial ingestion is an accepted terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Store`] only if the initial clear fails;
    /// per-chunk failures are reported in the returned [`IngestStats`].
    pub async fn ingest(&self, chunks: &[Chunk]) -> Result<IngestStats, ChorusError> {
        self.store.clear().await?;

        let mut stats = IngestStats {
            upserted: 0,
            failed: 0,
        };

        for chunk in chunks {
            match self.ingest_chunk(chunk).await {
                Ok(()) => stats.upserted += 1,
                Err(e) => {
                    eprintln!("warning: failed to ingest chunk {}: {e}", chunk.id);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    async fn ingest_chunk(&self, chunk: &Chunk) -> Result<(), ChorusError> {
        let metadata = truncate_chars(&chunk.text, self.max_metadata_chars);
        let vector = self.embedding.embed_one(&chunk.text).await?;
        self.store
            .upsert(&chunk.id, vector, Some(metadata))
            .await
    }

    /// Retrieve the `top_k` chunks most similar to a free-text query.
    ///
    /// Matches missing stored text are still reported (id + score) with
    /// `code: None`; callers filter when only text-bearing matches
    /// matter. An empty index yields an empty vec.
    ///
    /// # Errors
    ///
    /// Returns [`ChorusError::Embedding`] if the query cannot be
    /// embedded, or [`ChorusError::Store`] if the index query fails.
    /// Query-path failures propagate; nothing is caught here.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ChunkMatch>, ChorusError> {
        let vector = self.embedding.embed_one(query).await?;
        self.store.query(vector, top_k).await
    }
}

/// Truncate to at most `max_chars` characters, never splitting inside a
/// code point. Lossy by design: index payload limits bound the stored
/// text, not the embedded text.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
