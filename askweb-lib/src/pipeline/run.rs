use tracing::{info, warn};

use crate::answer::Answer;
use crate::config::QueryOptions;
use crate::embed::Embedder;
use crate::generate::Generator;
use crate::index::EmbeddingIndex;
use crate::pipeline::{IngestReport, Pipeline};
use crate::store::{SearchResult, VectorStore};
use crate::web::{Extractor, SearchProvider};
use crate::Result;

/// The external collaborators one run talks to
pub struct Collaborators<'a> {
    pub search: &'a dyn SearchProvider,
    pub extractor: &'a dyn Extractor,
    pub generator: &'a dyn Generator,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub urls: Vec<String>,
    pub report: IngestReport,
    pub results: Vec<SearchResult>,
    pub answer: Answer,
}

/// Search, extract, ingest, retrieve and answer a single query.
pub async fn ask<E: Embedder + 'static, S: VectorStore + 'static>(
    query: &str,
    options: &QueryOptions,
    index: EmbeddingIndex<E, S>,
    collaborators: Collaborators<'_>,
) -> Result<RunOutcome> {
    let mut pipeline = Pipeline::new(index, options)?;

    info!("searching the web");
    let urls = collaborators.search.search(query, options).await?;
    info!(links = urls.len(), query, "found links");
    if urls.is_empty() {
        warn!(query, "search returned no links");
    }

    info!("scraping and indexing sources");
    let report = pipeline.ingest_urls(&urls, collaborators.extractor).await?;

    info!("querying the index for context");
    let results = pipeline.retrieve(query)?;

    info!("running inference with context");
    let answer = Answer::generate(query, &results, collaborators.generator).await?;

    Ok(RunOutcome {
        urls,
        report,
        results,
        answer,
    })
}
