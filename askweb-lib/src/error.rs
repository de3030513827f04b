//! Error types for askweb

use thiserror::Error;

/// Result type alias for askweb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in askweb operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration or options, detected before any stage runs
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to load or run the embedding model
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Failed to store or retrieve from the vector store
    #[error("store error: {0}")]
    Store(String),

    /// The web search collaborator failed or returned a malformed response
    #[error("search error: {0}")]
    Search(String),

    /// A page could not be fetched or yielded no text
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The answer generation collaborator failed
    #[error("generation error: {0}")]
    Generation(String),

    /// Transport-level HTTP failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The pipeline was driven out of order
    #[error("invalid pipeline transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
