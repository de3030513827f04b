//! Run configuration
//!
//! [`Config`] holds credentials and endpoints; it is built once at startup
//! and handed by reference to the collaborators that need it. [`QueryOptions`]
//! holds the per-question knobs. Both are validated before any stage runs.

use std::fmt;
use std::time::Duration;

use crate::chunk::{FixedSizeChunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::retrieve::DEFAULT_TOP_N;
use crate::{Error, Result};

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_DOCUMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and endpoints for the external collaborators
#[derive(Clone)]
pub struct Config {
    pub search_api_key: String,
    pub search_engine_id: String,
    pub llm_api_key: String,
    pub llm_base_url: String,
}

impl Config {
    /// Build a config, reporting every missing value at once.
    pub fn new(
        search_api_key: Option<String>,
        search_engine_id: Option<String>,
        llm_api_key: Option<String>,
        llm_base_url: Option<String>,
    ) -> Result<Self> {
        let mut missing = Vec::new();
        let mut require = |value: Option<String>, name: &'static str| {
            match value.filter(|v| !v.trim().is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let search_api_key = require(search_api_key, "SEARCH_API_KEY");
        let search_engine_id = require(search_engine_id, "SEARCH_PROJECT_KEY");
        let llm_api_key = require(llm_api_key, "LLM_API_KEY");

        if !missing.is_empty() {
            return Err(Error::Config(format!("not set: {}", missing.join(", "))));
        }

        let llm_base_url = llm_base_url
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string());

        Ok(Self {
            search_api_key,
            search_engine_id,
            llm_api_key,
            llm_base_url,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("search_api_key", &"<redacted>")
            .field("search_engine_id", &self.search_engine_id)
            .field("llm_api_key", &"<redacted>")
            .field("llm_base_url", &self.llm_base_url)
            .finish()
    }
}

/// Per-question options
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    /// Restrict search results to the last N days; 0 means no restriction
    pub date_restrict: Option<u32>,
    /// Restrict search results to a single site
    pub target_site: Option<String>,
    /// Chat model used to write the answer
    pub model_name: String,
    /// Number of chunks handed to the answer model
    pub top_n: usize,
    /// Chunk window size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// Documents ingested in parallel
    pub concurrency: usize,
    /// Budget for fragmenting and embedding one document
    pub document_timeout: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            date_restrict: None,
            target_site: None,
            model_name: DEFAULT_MODEL.to_string(),
            top_n: DEFAULT_TOP_N,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            concurrency: DEFAULT_CONCURRENCY,
            document_timeout: DEFAULT_DOCUMENT_TIMEOUT,
        }
    }
}

impl QueryOptions {
    pub fn validate(&self) -> Result<()> {
        self.chunker()?;
        if self.model_name.trim().is_empty() {
            return Err(Error::Config("model name must not be empty".into()));
        }
        if self.top_n == 0 {
            return Err(Error::Config("top_n must be greater than 0".into()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be greater than 0".into()));
        }
        if self.document_timeout.is_zero() {
            return Err(Error::Config("document timeout must be greater than 0".into()));
        }
        Ok(())
    }

    /// Chunker for these options; fails on an invalid size/overlap pair.
    pub fn chunker(&self) -> Result<FixedSizeChunker> {
        FixedSizeChunker::new(self.chunk_size, self.chunk_overlap)
    }

    /// Date restriction in days, if one applies.
    pub fn date_restrict_days(&self) -> Option<u32> {
        self.date_restrict.filter(|days| *days > 0)
    }

    /// Target site, if one applies.
    pub fn site(&self) -> Option<&str> {
        self.target_site
            .as_deref()
            .map(str::trim)
            .filter(|site| !site.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_config_defaults_base_url() {
        let config = Config::new(some("k"), some("cx"), some("llm"), None).unwrap();
        assert_eq!(config.llm_base_url, DEFAULT_LLM_BASE_URL);
    }

    #[test]
    fn test_config_reports_all_missing() {
        let err = Config::new(None, some("cx"), Some("  ".into()), None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SEARCH_API_KEY"));
        assert!(msg.contains("LLM_API_KEY"));
        assert!(!msg.contains("SEARCH_PROJECT_KEY"));
    }

    #[test]
    fn test_config_debug_redacts_keys() {
        let config = Config::new(some("secret-1"), some("cx"), some("secret-2"), None).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-1"));
        assert!(!debug.contains("secret-2"));
    }

    #[test]
    fn test_default_options_are_valid() {
        let options = QueryOptions::default();
        options.validate().unwrap();
        assert_eq!(options.top_n, 10);
        assert_eq!(options.model_name, "gpt-4o-mini");
    }

    #[test]
    fn test_invalid_options() {
        let cases = [
            QueryOptions {
                chunk_overlap: 1000,
                ..QueryOptions::default()
            },
            QueryOptions {
                chunk_size: 0,
                chunk_overlap: 0,
                ..QueryOptions::default()
            },
            QueryOptions {
                concurrency: 0,
                ..QueryOptions::default()
            },
            QueryOptions {
                top_n: 0,
                ..QueryOptions::default()
            },
            QueryOptions {
                model_name: " ".into(),
                ..QueryOptions::default()
            },
            QueryOptions {
                document_timeout: Duration::ZERO,
                ..QueryOptions::default()
            },
        ];
        for options in cases {
            assert!(matches!(options.validate(), Err(Error::Config(_))), "{options:?}");
        }
    }

    #[test]
    fn test_search_restrictions() {
        let options = QueryOptions {
            date_restrict: Some(0),
            target_site: Some("  ".into()),
            ..QueryOptions::default()
        };
        assert_eq!(options.date_restrict_days(), None);
        assert_eq!(options.site(), None);

        let options = QueryOptions {
            date_restrict: Some(7),
            target_site: Some("docs.rs".into()),
            ..QueryOptions::default()
        };
        assert_eq!(options.date_restrict_days(), Some(7));
        assert_eq!(options.site(), Some("docs.rs"));
    }
}
