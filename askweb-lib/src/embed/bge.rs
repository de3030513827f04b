use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// BGE embedder using BAAI/bge-small-en-v1.5.
///
/// Uses fastembed for ONNX-based inference. This model produces
/// 384-dimensional embeddings and supports up to 512 tokens per input.
pub struct BgeEmbedder {
    model: Mutex<TextEmbedding>,
}

impl BgeEmbedder {
    /// Create a new BGE embedder.
    ///
    /// Downloads the model on first use (~130MB).
    pub fn new() -> Result<Self> {
        let opts = InitOptions::new(EmbeddingModel::BGESmallENV15)
            .with_show_download_progress(true);

        TextEmbedding::try_new(opts)
            .map(|model| Self {
                model: Mutex::new(model),
            })
            .map_err(|e| Error::Embedding(e.to_string()))
    }
}

impl Embedder for BgeEmbedder {
    fn model_name(&self) -> &str {
        "BAAI/bge-small-en-v1.5"
    }

    fn dimension(&self) -> usize {
        384
    }

    // one model behind one lock
    fn max_concurrent_calls(&self) -> usize {
        1
    }

    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut model = self
            .model
            .lock()
            .map_err(|_| Error::Embedding("embedding model lock poisoned".to_string()))?;
        let embeddings = model
            .embed(texts, None)
            .map_err(|e| Error::Embedding(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "model returned {} embeddings for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings)
    }
}
