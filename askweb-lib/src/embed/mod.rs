//! Text embedding
//!
//! The index depends on embeddings only through the [`Embedder`] trait, so
//! the model is swappable. The one requirement is determinism: identical
//! text must map to the identical vector within a run, and every vector an
//! embedder produces has the same dimension.
//!
//! # Usage
//!
//! ```ignore
//! use askweb_lib::embed::{BgeEmbedder, Embedder};
//!
//! let embedder = BgeEmbedder::new()?;
//!
//! // Embed chunk texts (for indexing)
//! let vectors = embedder.embed_documents(&["Rust 1.0 shipped in 2015...", "..."])?;
//!
//! // Embed a query (for searching)
//! let query = embedder.embed_query("When was Rust 1.0 released?")?;
//! ```

use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
///
/// Implementations are shared between ingestion workers, so they take
/// `&self` and must be `Send + Sync`.
pub trait Embedder: Send + Sync {
    /// Embed multiple texts, returning one vector per input in input order
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query
    ///
    /// Queries go through the same function as documents so that scores are
    /// comparable.
    fn embed_query(&self, text: &str) -> Result<Embedding> {
        self.embed_documents(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;

    /// Calls to [`Self::embed_documents`] that can make progress at once.
    ///
    /// Ingestion never runs more embedding calls than this in parallel, and a
    /// document's time budget only starts once its call is admitted.
    fn max_concurrent_calls(&self) -> usize {
        1
    }
}

mod bge;
pub use bge::*;

#[cfg(test)]
pub(crate) mod stub;
