//! Pipeline coordinator
//!
//! Drives one run: documents are fragmented and embedded, then a single
//! query is answered from the index. Ingestion is best-effort. A source that
//! yields no text, fails to embed, or runs past its time budget is recorded
//! as skipped and the run carries on. Documents are prepared concurrently,
//! but their chunks are committed to the index in input order, so insertion
//! order (and with it tie-breaking) does not depend on scheduling.
//!
//! # Usage
//!
//! ```ignore
//! let mut pipeline = Pipeline::new(EmbeddingIndex::in_memory(embedder), &options)?;
//! let report = pipeline.ingest(documents).await?;
//! let results = pipeline.retrieve("When was Rust 1.0 released?")?;
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::chunk::{Chunk, Chunker, Document, FixedSizeChunker};
use crate::config::QueryOptions;
use crate::embed::{Embedder, Embedding};
use crate::index::EmbeddingIndex;
use crate::retrieve::Retriever;
use crate::store::{MemoryStore, SearchResult, VectorStore};
use crate::web::Extractor;
use crate::{Error, Result};

mod run;
mod state;

pub use run::*;
pub use state::*;

/// A source whose chunks made it into the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedSource {
    pub source_id: String,
    pub chunks: usize,
}

/// A source that contributed nothing, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub source_id: String,
    pub reason: String,
}

/// Outcome of ingestion, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub ingested: Vec<IngestedSource>,
    pub skipped: Vec<SkippedSource>,
}

impl IngestReport {
    /// `true` when at least one source was skipped.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Total chunks committed.
    pub fn chunks(&self) -> usize {
        self.ingested.iter().map(|s| s.chunks).sum()
    }
}

/// Single-use coordinator over an [`EmbeddingIndex`].
pub struct Pipeline<E: Embedder + 'static, S: VectorStore + 'static = MemoryStore> {
    index: Arc<EmbeddingIndex<E, S>>,
    chunker: FixedSizeChunker,
    concurrency: usize,
    embed_slots: Arc<Semaphore>,
    document_timeout: Duration,
    top_n: usize,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl<E: Embedder + 'static, S: VectorStore + 'static> Pipeline<E, S> {
    /// Create a pipeline, failing fast on invalid options.
    pub fn new(index: EmbeddingIndex<E, S>, options: &QueryOptions) -> Result<Self> {
        options.validate()?;
        let slots = index
            .embedder()
            .max_concurrent_calls()
            .clamp(1, options.concurrency.min(Semaphore::MAX_PERMITS));
        Ok(Self {
            index: Arc::new(index),
            chunker: options.chunker()?,
            concurrency: options.concurrency,
            embed_slots: Arc::new(Semaphore::new(slots)),
            document_timeout: options.document_timeout,
            top_n: options.top_n,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        })
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Every state this run has been in, oldest first.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn index(&self) -> &EmbeddingIndex<E, S> {
        &self.index
    }

    fn transition(&mut self, next: PipelineState) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next.clone();
        self.history.push(next);
        Ok(())
    }

    /// Ingest already-extracted documents.
    pub async fn ingest(&mut self, documents: Vec<Document>) -> Result<IngestReport> {
        self.ingest_with(documents, Vec::new()).await
    }

    /// Extract `urls` and ingest whatever text comes back. URLs the extractor
    /// could not turn into a document are reported as skipped.
    pub async fn ingest_urls(
        &mut self,
        urls: &[String],
        extractor: &dyn Extractor,
    ) -> Result<IngestReport> {
        if !self.state.can_transition_to(&PipelineState::Ingesting) {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: PipelineState::Ingesting.to_string(),
            });
        }

        // a URL listed twice is fetched and indexed once
        let mut seen = HashSet::new();
        let urls: Vec<String> = urls
            .iter()
            .filter(|url| seen.insert(url.as_str()))
            .cloned()
            .collect();

        let documents = extractor.extract(&urls).await;
        info!(scraped = documents.len(), requested = urls.len(), "scraped sources");

        let extracted: HashSet<&str> = documents.iter().map(|d| d.source_id.as_str()).collect();
        let missing: Vec<SkippedSource> = urls
            .iter()
            .filter(|url| !extracted.contains(url.as_str()))
            .map(|url| SkippedSource {
                source_id: url.clone(),
                reason: "extraction failed".to_string(),
            })
            .collect();

        self.ingest_with(documents, missing).await
    }

    async fn ingest_with(
        &mut self,
        documents: Vec<Document>,
        mut skipped: Vec<SkippedSource>,
    ) -> Result<IngestReport> {
        self.transition(PipelineState::Ingesting)?;
        info!(documents = documents.len(), "ingesting documents");

        let index = Arc::clone(&self.index);
        let chunker = self.chunker;
        let budget = self.document_timeout;
        let slots = Arc::clone(&self.embed_slots);

        // buffered keeps input order, so commits happen in document order
        let mut ingested = Vec::new();
        let mut prepared = stream::iter(documents)
            .map(|document| {
                let index = Arc::clone(&index);
                let slots = Arc::clone(&slots);
                async move {
                    let source_id = document.source_id.clone();
                    let prepared = prepare(index, &slots, chunker, document, budget).await;
                    (source_id, prepared)
                }
            })
            .buffered(self.concurrency);

        while let Some((source_id, outcome)) = prepared.next().await {
            let committed = outcome
                .and_then(|(chunks, embeddings)| {
                    index.commit(&chunks, &embeddings)?;
                    Ok(chunks.len())
                });
            match committed {
                Ok(chunks) => {
                    debug!(source = %source_id, chunks, "ingested source");
                    ingested.push(IngestedSource { source_id, chunks });
                }
                Err(e) => {
                    warn!(source = %source_id, error = %e, "skipping source");
                    skipped.push(SkippedSource {
                        source_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let report = IngestReport { ingested, skipped };
        if report.is_partial() {
            self.transition(PipelineState::IngestFailed {
                skipped: report.skipped.len(),
            })?;
        }
        self.transition(PipelineState::Ready)?;
        info!(
            sources = report.ingested.len(),
            skipped = report.skipped.len(),
            chunks = report.chunks(),
            "ingestion finished"
        );
        Ok(report)
    }

    /// Retrieve the ranked context for `query`. Only one query per run.
    pub fn retrieve(&mut self, query: &str) -> Result<Vec<SearchResult>> {
        self.transition(PipelineState::Retrieving)?;
        let results = Retriever::new(self.index.as_ref())
            .with_top_n(self.top_n)
            .retrieve(query);
        self.transition(PipelineState::Done)?;

        let results = results?;
        info!(results = results.len(), "retrieved context");
        Ok(results)
    }
}

/// Fragment and embed one document off the async runtime.
///
/// The budget starts once the document holds an embedding slot. The slot is
/// released when the blocking work ends, even if the budget ran out first.
async fn prepare<E: Embedder + 'static, S: VectorStore + 'static>(
    index: Arc<EmbeddingIndex<E, S>>,
    slots: &Arc<Semaphore>,
    chunker: FixedSizeChunker,
    document: Document,
    budget: Duration,
) -> Result<(Vec<Chunk>, Vec<Embedding>)> {
    if document.text.is_empty() {
        return Err(Error::Extraction("no text extracted".to_string()));
    }

    let slot = Arc::clone(slots)
        .acquire_owned()
        .await
        .map_err(|e| Error::Embedding(format!("embedding slots closed: {e}")))?;

    let work = tokio::task::spawn_blocking(move || -> Result<(Vec<Chunk>, Vec<Embedding>)> {
        let _slot = slot;
        let chunks = chunker.chunk(&document);
        let embeddings = index.embed_chunks(&chunks)?;
        Ok((chunks, embeddings))
    });

    match tokio::time::timeout(budget, work).await {
        Ok(Ok(prepared)) => prepared,
        Ok(Err(e)) => Err(Error::Embedding(format!("embedding worker failed: {e}"))),
        Err(_) => Err(Error::Embedding(format!(
            "timed out after {}ms",
            budget.as_millis()
        ))),
    }
}
