//! Public retrieval contract over an [`EmbeddingIndex`].

use crate::embed::Embedder;
use crate::index::EmbeddingIndex;
use crate::store::{SearchResult, VectorStore};
use crate::Result;

/// Number of results returned when the caller does not ask for a count
pub const DEFAULT_TOP_N: usize = 10;

/// Ranked lookup of the chunks most relevant to a query.
///
/// Asking for more results than the index holds returns everything it holds;
/// results are never padded.
pub struct Retriever<'a, E: Embedder, S: VectorStore> {
    index: &'a EmbeddingIndex<E, S>,
    top_n: usize,
}

impl<'a, E: Embedder, S: VectorStore> Retriever<'a, E, S> {
    #[must_use]
    pub fn new(index: &'a EmbeddingIndex<E, S>) -> Self {
        Self {
            index,
            top_n: DEFAULT_TOP_N,
        }
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Retrieve using the configured result count.
    pub fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.retrieve_top(query, None)
    }

    /// Retrieve `top_n` results, or the configured count when `None`.
    pub fn retrieve_top(&self, query: &str, top_n: Option<usize>) -> Result<Vec<SearchResult>> {
        let top_n = top_n.unwrap_or(self.top_n).min(self.index.len());
        self.index.search(query, top_n)
    }
}
