use crate::chunk::{Chunk, Chunker, Document};
use crate::{Error, Result};

/// Chunk size used when none is configured, in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Overlap used when none is configured, in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Fixed-size chunker - sliding character window
///
/// Windows are `chunk_size` characters wide and start every
/// `chunk_size - overlap` characters, beginning at offset 0. Chunking stops
/// at the first window that reaches the end of the text, clipped if it runs
/// past it. Text is taken as-is; whitespace is not normalised here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    /// Create a chunker, rejecting settings that could never make progress.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk size must be greater than 0".into()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk overlap {overlap} must be smaller than chunk size {chunk_size}"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the starts of consecutive windows.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Chunker for FixedSizeChunker {
    fn name(&self) -> &str {
        "fixed"
    }

    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let text = document.text.as_str();

        // byte offset of every char, plus the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let len = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < len {
            let end = (start + self.chunk_size).min(len);
            chunks.push(Chunk {
                source_id: document.source_id.clone(),
                index: chunks.len(),
                offset: start,
                content: text[bounds[start]..bounds[end]].to_string(),
            });
            if end == len {
                break;
            }
            start += self.stride();
        }
        chunks
    }
}
