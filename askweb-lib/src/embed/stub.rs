//! Deterministic embedders for tests.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

pub(crate) const STUB_DIMENSION: usize = 64;

/// Hashed bag-of-words: texts sharing words point the same way.
pub(crate) struct KeywordEmbedder {
    /// Texts containing this marker fail to embed
    poison: Option<String>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub(crate) fn new() -> Self {
        Self {
            poison: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing_on(marker: &str) -> Self {
        Self {
            poison: Some(marker.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn vector(text: &str) -> Embedding {
        let mut v = vec![0.0; STUB_DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            v[(hasher.finish() % STUB_DIMENSION as u64) as usize] += 1.0;
        }
        v
    }
}

impl Embedder for KeywordEmbedder {
    fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        texts
            .iter()
            .map(|text| match &self.poison {
                Some(marker) if text.contains(marker.as_str()) => {
                    Err(Error::Embedding(format!("refusing to embed '{marker}'")))
                }
                _ => Ok(Self::vector(text)),
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        STUB_DIMENSION
    }

    fn model_name(&self) -> &str {
        "keyword-stub"
    }

    fn max_concurrent_calls(&self) -> usize {
        usize::MAX
    }
}
