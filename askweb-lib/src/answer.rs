//! Cited answers
//!
//! Citation numbers are 1-based positions in the retrieval result list; the
//! reference list maps each number back to its source.

use std::fmt;

use crate::generate::{ContextEntry, Generator, NO_INFORMATION};
use crate::store::SearchResult;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub number: usize,
    pub source_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub references: Vec<Reference>,
}

impl Answer {
    /// Generate an answer from ranked results.
    ///
    /// With no results the generator is not called and the answer says no
    /// information was found.
    pub async fn generate(
        query: &str,
        results: &[SearchResult],
        generator: &dyn Generator,
    ) -> Result<Self> {
        if results.is_empty() {
            return Ok(Self::no_information());
        }

        let context: Vec<ContextEntry> = results.iter().map(ContextEntry::from).collect();
        let text = generator.generate(query, &context).await?;
        Ok(Self {
            text,
            references: references(results),
        })
    }

    pub fn no_information() -> Self {
        Self {
            text: NO_INFORMATION.to_string(),
            references: Vec::new(),
        }
    }
}

/// Number results 1..N in ranking order.
pub fn references(results: &[SearchResult]) -> Vec<Reference> {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| Reference {
            number: i + 1,
            source_id: result.chunk.source_id.clone(),
        })
        .collect()
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Answer\n\n{}\n", self.text.trim_end())?;
        writeln!(f, "# References")?;
        for reference in &self.references {
            writeln!(f, "[{}] {}", reference.number, reference.source_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::chunk::Chunk;
    use crate::Error;

    /// Records what it was asked and cites every entry.
    struct EchoGenerator {
        seen: Mutex<Vec<ContextEntry>>,
    }

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, query: &str, context: &[ContextEntry]) -> Result<String> {
            self.seen
                .lock()
                .map_err(|_| Error::Generation("poisoned".into()))?
                .extend_from_slice(context);
            let cites: String = (1..=context.len()).map(|i| format!("[{i}]")).collect();
            Ok(format!("{query} {cites}"))
        }
    }

    struct BrokenGenerator;

    #[async_trait]
    impl Generator for BrokenGenerator {
        async fn generate(&self, _query: &str, _context: &[ContextEntry]) -> Result<String> {
            Err(Error::Generation("upstream unavailable".into()))
        }
    }

    fn result(source_id: &str, content: &str, score: f32) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                source_id: source_id.into(),
                index: 0,
                offset: 0,
                content: content.into(),
            },
            score,
            inserted_order: 0,
        }
    }

    #[tokio::test]
    async fn test_references_follow_result_order() {
        let generator = EchoGenerator {
            seen: Mutex::new(Vec::new()),
        };
        let results = vec![
            result("https://b.example", "bee", 0.9),
            result("https://a.example", "ay", 0.5),
            result("https://b.example", "bee again", 0.4),
        ];

        let answer = Answer::generate("q?", &results, &generator).await.unwrap();

        assert_eq!(answer.text, "q? [1][2][3]");
        let sources: Vec<_> = answer.references.iter().map(|r| r.source_id.as_str()).collect();
        assert_eq!(sources, vec!["https://b.example", "https://a.example", "https://b.example"]);
        assert_eq!(answer.references[2].number, 3);

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen[0].text, "bee");
        assert_eq!(seen[1].source_id, "https://a.example");
    }

    #[tokio::test]
    async fn test_no_results_skips_generation() {
        let answer = Answer::generate("q?", &[], &BrokenGenerator).await.unwrap();
        assert_eq!(answer, Answer::no_information());
    }

    #[tokio::test]
    async fn test_generation_failure_is_returned() {
        let results = vec![result("a", "text", 1.0)];
        let err = Answer::generate("q?", &results, &BrokenGenerator)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn test_render() {
        let answer = Answer {
            text: "Rust 1.0 shipped in 2015[1].\n".into(),
            references: vec![Reference {
                number: 1,
                source_id: "https://blog.rust-lang.org".into(),
            }],
        };
        assert_eq!(
            answer.to_string(),
            "# Answer\n\nRust 1.0 shipped in 2015[1].\n\n# References\n[1] https://blog.rust-lang.org\n"
        );
    }
}
