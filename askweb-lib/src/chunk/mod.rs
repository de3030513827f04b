//! Document fragmentation
//!
//! A [`Document`] is the plain text the extraction step produced for one
//! source. A [`Chunker`] turns it into ordered [`Chunk`]s, each carrying the
//! source it came from and its position within that source. The position
//! backs the citation a user eventually sees, so for the same document and
//! chunker settings it must always come out the same.
//!
//! # Implementing a Chunker
//!
//! ```ignore
//! use askweb_lib::chunk::{Chunk, Chunker, Document};
//!
//! struct MyChunker { /* ... */ }
//!
//! impl Chunker for MyChunker {
//!     fn chunk(&self, document: &Document) -> Vec<Chunk> {
//!         // Your chunking logic here
//!         todo!()
//!     }
//!
//!     fn name(&self) -> &str {
//!         "mine"
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Extracted plain text for a single source
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Document {
    /// URL or other stable identifier of the source
    pub source_id: String,
    /// Plain text, as produced by extraction
    pub text: String,
}

impl Document {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// A window of a document's text
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// Source document identifier
    pub source_id: String,
    /// Position within the source document, contiguous from 0 in scan order
    pub index: usize,
    /// Character offset of the first character of this chunk
    pub offset: usize,
    /// The text content of this chunk
    pub content: String,
}

impl Chunk {
    /// Identity of this chunk within an index.
    #[must_use]
    pub fn key(&self) -> ChunkKey {
        ChunkKey {
            source_id: self.source_id.clone(),
            index: self.index,
        }
    }
}

/// Identity of a chunk: re-ingesting the same key replaces the stored entry
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChunkKey {
    pub source_id: String,
    pub index: usize,
}

/// Trait for document chunking strategies
pub trait Chunker: Send + Sync {
    /// Split a document into chunks
    ///
    /// An empty document yields no chunks. Chunk indices start at 0 and are
    /// assigned left to right.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;

    /// Returns the name of this chunking strategy
    fn name(&self) -> &str;
}

mod fixed;

pub use fixed::*;
