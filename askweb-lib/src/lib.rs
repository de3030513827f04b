//! askweb - answer questions from the web with cited sources
//!
//! # Architecture
//!
//! ```text
//! Query -> Search -> URLs -> Extract -> Documents
//!                                          |
//!                               Chunker -> Embedder -> Store
//!                                                        |
//! Query -> Embedder -> Retriever <-----------------------+
//!                         |
//!                   ranked chunks -> Generator -> Answer + References
//! ```
//!
//! # Example
//!
//! ```ignore
//! use askweb_lib::{
//!     chunk::Document, config::QueryOptions, embed::BgeEmbedder,
//!     index::EmbeddingIndex, pipeline::Pipeline,
//! };
//!
//! let index = EmbeddingIndex::in_memory(BgeEmbedder::new()?);
//! let mut pipeline = Pipeline::new(index, &QueryOptions::default())?;
//!
//! // Index documents
//! let report = pipeline.ingest(vec![Document::new("notes.txt", text)]).await?;
//!
//! // Search
//! let results = pipeline.retrieve("Who won the match?")?;
//! ```

pub mod answer;
pub mod chunk;
pub mod config;
pub mod embed;
pub mod error;
pub mod generate;
pub mod index;
pub mod pipeline;
pub mod retrieve;
pub mod store;
pub mod web;

pub use error::{Error, Result};
