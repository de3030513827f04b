//! Vector storage backends
//!
//! # Storage Model
//!
//! Each stored item is an [`IndexedEntry`]:
//! - Chunk: the original text and its source position
//! - Embedding: the vector representation
//! - Insertion order: a run-wide counter used only to break score ties
//!
//! Entries are keyed by [`ChunkKey`]; inserting a chunk whose key is already
//! present replaces the stored text and vector instead of adding a second
//! entry.
//!
//! # Usage
//!
//! ```ignore
//! use askweb_lib::store::{MemoryStore, VectorStore};
//!
//! let store = MemoryStore::new();
//!
//! // Insert chunks with their embeddings
//! store.insert(&chunks, &embeddings)?;
//!
//! // Search by vector similarity
//! let results = store.search(&query_embedding, 5)?;
//! ```

use std::cmp::Ordering;

use crate::chunk::{Chunk, ChunkKey};
use crate::embed::Embedding;
use crate::Result;

/// A stored chunk together with its vector
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntry {
    pub chunk: Chunk,
    pub embedding: Embedding,
    /// Assigned when the key is first inserted; strictly increasing and
    /// unique across the store
    pub inserted_order: u64,
}

/// A search result with similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The matched chunk
    pub chunk: Chunk,
    /// Similarity score (higher is more similar)
    /// For cosine similarity: -1.0 to 1.0
    pub score: f32,
    /// Insertion order of the matched entry
    pub inserted_order: u64,
}

impl SearchResult {
    /// Ranking order: higher score first, then earlier insertion first.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.inserted_order.cmp(&other.inserted_order))
    }
}

/// Trait for vector storage backends
///
/// Stores are shared between ingestion workers and the retriever, so all
/// operations take `&self`.
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embeddings
    ///
    /// # Arguments
    /// * `chunks` - The text chunks to store
    /// * `embeddings` - Corresponding embeddings (must be same length)
    ///
    /// A batch is applied entirely or not at all, and its new entries receive
    /// consecutive insertion orders.
    fn insert(&self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()>;

    /// Search for similar chunks
    ///
    /// # Arguments
    /// * `query_embedding` - The query vector
    /// * `k` - Number of results to return
    ///
    /// # Returns
    /// At most `k` results sorted by [`SearchResult::rank_cmp`]. An empty
    /// store yields an empty list.
    fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Look up a single entry by chunk identity
    fn get(&self, key: &ChunkKey) -> Option<IndexedEntry>;

    /// Get total number of stored chunks
    fn len(&self) -> usize;

    /// Check if store is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

mod memory;
mod similarity;

pub use memory::*;
pub use similarity::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: f32, inserted_order: u64) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                source_id: "s".into(),
                index: inserted_order as usize,
                offset: 0,
                content: String::new(),
            },
            score,
            inserted_order,
        }
    }

    #[test]
    fn test_rank_cmp_prefers_higher_score() {
        assert_eq!(result(0.9, 5).rank_cmp(&result(0.1, 0)), Ordering::Less);
        assert_eq!(result(0.1, 0).rank_cmp(&result(0.9, 5)), Ordering::Greater);
    }

    #[test]
    fn test_rank_cmp_breaks_ties_by_insertion() {
        assert_eq!(result(0.5, 1).rank_cmp(&result(0.5, 2)), Ordering::Less);
        assert_eq!(result(0.5, 2).rank_cmp(&result(0.5, 1)), Ordering::Greater);
    }
}
