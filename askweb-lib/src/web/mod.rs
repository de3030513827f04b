//! Web collaborators: turning a query into source URLs, and URLs into text.
//!
//! The pipeline only needs "an ordered list of URLs for a query" and "plain
//! text per source", expressed by [`SearchProvider`] and [`Extractor`].

use async_trait::async_trait;

use crate::chunk::Document;
use crate::config::QueryOptions;
use crate::Result;

/// Finds candidate source URLs for a query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Ordered result URLs, best first. No results is `Ok(vec![])`.
    async fn search(&self, query: &str, options: &QueryOptions) -> Result<Vec<String>>;
}

/// Fetches sources and extracts their plain text.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Documents in the order of `urls`. Sources that could not be fetched
    /// or yielded no text are left out.
    async fn extract(&self, urls: &[String]) -> Vec<Document>;
}

mod extract;
mod search;

pub use extract::*;
pub use search::*;
