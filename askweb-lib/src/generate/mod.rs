//! Answer generation
//!
//! A [`Generator`] receives the question and the retrieved context in
//! citation order, and writes an answer that refers to context entries by
//! their 1-based position (`[1]`, `[2]`, ...).

use async_trait::async_trait;

use crate::store::SearchResult;
use crate::Result;

/// Sentence the model is told to use when the context does not help
pub const NO_INFORMATION: &str = "No related information found in the context.";

/// One numbered piece of context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub text: String,
    pub source_id: String,
}

impl From<&SearchResult> for ContextEntry {
    fn from(result: &SearchResult) -> Self {
        Self {
            text: result.chunk.content.clone(),
            source_id: result.chunk.source_id.clone(),
        }
    }
}

/// Writes an answer from ranked context.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, query: &str, context: &[ContextEntry]) -> Result<String>;
}

/// Render context as `[i] text` lines, numbered from 1.
pub fn render_context(context: &[ContextEntry]) -> String {
    context
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("[{}] {}\n", i + 1, entry.text))
        .collect()
}

/// Build the user prompt for a question and its context.
pub fn build_prompt(query: &str, context: &[ContextEntry]) -> String {
    format!(
        "Given the context as a sequence of references with a reference id in the \
format of a leading [x], please answer the following question:

{query}

In the answer, use format [1], [2], ..., [n] in line where the reference is used. \
For example, \"According to the research from Google[3], ...\".

Please create the answer strictly related to the context. If the context has no \
information about the query, please write \"{NO_INFORMATION}\"

Here is the context:
{context}",
        context = render_context(context)
    )
}

mod openai;

pub use openai::*;
