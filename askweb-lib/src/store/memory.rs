use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::chunk::{Chunk, ChunkKey};
use crate::embed::Embedding;
use crate::store::{IndexedEntry, SearchResult, Similarity, VectorStore};
use crate::{Error, Result};

/// In-memory vector store for a single run.
///
/// Uses brute-force similarity search over every entry. Suitable for the few
/// thousand chunks a handful of web pages produce.
pub struct MemoryStore {
    similarity: Similarity,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<ChunkKey, IndexedEntry>,
    next_order: u64,
    dimension: Option<usize>,
}

impl MemoryStore {
    /// Create a new empty in-memory store using cosine similarity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_similarity(Similarity::default())
    }

    /// Create a new empty in-memory store using the given similarity policy.
    #[must_use]
    pub fn with_similarity(similarity: Similarity) -> Self {
        Self {
            similarity,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn similarity(&self) -> Similarity {
        self.similarity
    }

    /// Dimension fixed by the first insert, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dimension
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn check_dimension(expected: Option<usize>, actual: usize) -> Result<()> {
    match expected {
        Some(dim) if dim != actual => Err(Error::Store(format!(
            "embedding has {actual} dimensions, store holds {dim}"
        ))),
        _ => Ok(()),
    }
}

impl VectorStore for MemoryStore {
    fn insert(&self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(Error::Store(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Ok(());
        }

        let mut inner = self
            .inner
            .write()
            .map_err(|_| Error::Store("store lock poisoned".to_string()))?;

        // validate the whole batch before touching any entry
        let dimension = inner.dimension.unwrap_or(embeddings[0].len());
        for embedding in embeddings {
            check_dimension(Some(dimension), embedding.len())?;
        }
        inner.dimension = Some(dimension);

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let key = chunk.key();
            let existing = inner.entries.get(&key).map(|e| e.inserted_order);
            let inserted_order = match existing {
                Some(order) => order,
                None => {
                    let order = inner.next_order;
                    inner.next_order += 1;
                    order
                }
            };
            inner.entries.insert(
                key,
                IndexedEntry {
                    chunk: chunk.clone(),
                    embedding: embedding.clone(),
                    inserted_order,
                },
            );
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| Error::Store("store lock poisoned".to_string()))?;

        if k == 0 || inner.entries.is_empty() {
            return Ok(Vec::new());
        }
        check_dimension(inner.dimension, query.len())?;

        let mut results: Vec<SearchResult> = inner
            .entries
            .values()
            .map(|entry| {
                let score = self.similarity.score(query, &entry.embedding);
                SearchResult {
                    chunk: entry.chunk.clone(),
                    score: if score.is_nan() { f32::MIN } else { score },
                    inserted_order: entry.inserted_order,
                }
            })
            .collect();

        results.sort_by(SearchResult::rank_cmp);
        results.truncate(k);
        Ok(results)
    }

    fn get(&self, key: &ChunkKey) -> Option<IndexedEntry> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(key)
            .cloned()
    }

    fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}
