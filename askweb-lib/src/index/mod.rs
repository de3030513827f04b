//! Embedding index
//!
//! Combines an embedder and a vector store: chunks go in as text and come
//! back out ranked against a text query.
//!
//! # Usage
//!
//! ```ignore
//! use askweb_lib::index::EmbeddingIndex;
//!
//! let index = EmbeddingIndex::new(embedder, MemoryStore::new());
//! index.insert_all(&chunks)?;
//! let results = index.search("When was Rust 1.0 released?", 5)?;
//! ```

use tracing::debug;

use crate::chunk::Chunk;
use crate::embed::{Embedder, Embedding};
use crate::store::{MemoryStore, SearchResult, VectorStore};
use crate::Result;

/// Owns every stored entry; nothing else writes to the store.
pub struct EmbeddingIndex<E: Embedder, S: VectorStore = MemoryStore> {
    embedder: E,
    store: S,
}

impl<E: Embedder> EmbeddingIndex<E, MemoryStore> {
    /// Create an index backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory(embedder: E) -> Self {
        Self::new(embedder, MemoryStore::new())
    }
}

impl<E: Embedder, S: VectorStore> EmbeddingIndex<E, S> {
    #[must_use]
    pub fn new(embedder: E, store: S) -> Self {
        Self { embedder, store }
    }

    /// Embed and store a single chunk.
    pub fn insert(&self, chunk: &Chunk) -> Result<()> {
        self.insert_all(std::slice::from_ref(chunk))
    }

    /// Embed and store a batch of chunks.
    ///
    /// If any chunk fails to embed, nothing from the batch is stored.
    pub fn insert_all(&self, chunks: &[Chunk]) -> Result<()> {
        let embeddings = self.embed_chunks(chunks)?;
        self.commit(chunks, &embeddings)
    }

    /// Compute embeddings for chunks without storing them.
    pub fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        self.embedder.embed_documents(&texts)
    }

    /// Store chunks whose embeddings were computed by [`Self::embed_chunks`].
    pub fn commit(&self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()> {
        self.store.insert(chunks, embeddings)?;
        debug!(chunks = chunks.len(), total = self.store.len(), "committed chunks");
        Ok(())
    }

    /// Rank stored chunks against a text query.
    ///
    /// Returns at most `top_n` results. Searching an empty index returns an
    /// empty list without calling the embedder.
    pub fn search(&self, query: &str, top_n: usize) -> Result<Vec<SearchResult>> {
        if self.store.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query)?;
        self.store.search(&query_embedding, top_n)
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no chunks are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkKey, Chunker, Document, FixedSizeChunker};
    use crate::embed::stub::KeywordEmbedder;
    use crate::Error;

    fn chunk(source_id: &str, index: usize, content: &str) -> Chunk {
        Chunk {
            source_id: source_id.to_string(),
            index,
            offset: 0,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_search_finds_matching_chunk() {
        let index = EmbeddingIndex::in_memory(KeywordEmbedder::new());
        index.insert(&chunk("a", 0, "tokio is an async runtime")).unwrap();
        index.insert(&chunk("b", 0, "bread needs flour and yeast")).unwrap();
        index.insert(&chunk("c", 0, "the sourdough starter smells sour")).unwrap();

        let results = index.search("flour yeast bread", 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.source_id, "b");
    }

    #[test]
    fn test_empty_index_does_not_embed_query() {
        let index = EmbeddingIndex::in_memory(KeywordEmbedder::new());
        let results = index.search("anything", 10).unwrap();
        assert!(results.is_empty());
        assert_eq!(index.embedder().calls(), 0);
    }

    #[test]
    fn test_reinsert_is_idempotent() {
        let index = EmbeddingIndex::in_memory(KeywordEmbedder::new());
        index.insert(&chunk("a", 0, "old words")).unwrap();
        index.insert(&chunk("a", 0, "new words")).unwrap();

        assert_eq!(index.len(), 1);
        let key = ChunkKey {
            source_id: "a".into(),
            index: 0,
        };
        let entry = index.store().get(&key).unwrap();
        assert_eq!(entry.chunk.content, "new words");
        assert_eq!(entry.embedding, KeywordEmbedder::vector("new words"));
    }

    #[test]
    fn test_failed_batch_stores_nothing() {
        let index = EmbeddingIndex::in_memory(KeywordEmbedder::failing_on("POISON"));
        let chunks = vec![chunk("a", 0, "fine"), chunk("a", 1, "POISON pill")];

        let err = index.insert_all(&chunks).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(index.is_empty());

        index.insert(&chunk("b", 0, "still fine")).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_query_embedding_failure_is_returned() {
        let index = EmbeddingIndex::in_memory(KeywordEmbedder::failing_on("POISON"));
        index.insert(&chunk("a", 0, "fine")).unwrap();

        assert!(matches!(index.search("POISON", 5), Err(Error::Embedding(_))));
    }

    #[test]
    fn test_repeated_search_is_deterministic() {
        let index = EmbeddingIndex::in_memory(KeywordEmbedder::new());
        let chunker = FixedSizeChunker::new(12, 4).unwrap();
        for (source, text) in [
            ("one", "rust ownership and borrowing rules keep memory safe"),
            ("two", "garbage collected languages trade memory for latency"),
            ("three", "rust rust rust memory memory"),
        ] {
            index
                .insert_all(&chunker.chunk(&Document::new(source, text)))
                .unwrap();
        }

        let first = index.search("rust memory", 10).unwrap();
        for _ in 0..5 {
            assert_eq!(index.search("rust memory", 10).unwrap(), first);
        }
        assert!(first
            .windows(2)
            .all(|w| w[0].rank_cmp(&w[1]) != std::cmp::Ordering::Greater));
    }
}
