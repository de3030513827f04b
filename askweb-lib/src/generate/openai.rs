use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::generate::{build_prompt, ContextEntry, Generator};
use crate::{Error, Result};

const SYSTEM_PROMPT: &str =
    "You are expert summarizing the answers based on the provided contents.";

/// Chat completions against any OpenAI-compatible endpoint.
pub struct OpenAiGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(config: &Config, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(120)).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                config.llm_base_url.trim_end_matches('/')
            ),
            api_key: config.llm_api_key.clone(),
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, query: &str, context: &[ContextEntry]) -> Result<String> {
        let prompt = build_prompt(query, context);
        debug!(model = %self.model, "running inference");
        debug!(prompt = %prompt, "final user prompt");

        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.trim())
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Generation(format!("{status}: {text}")));
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("no completion from the API".to_string()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = Config::new(
            Some("k".into()),
            Some("cx".into()),
            Some("llm".into()),
            Some("http://localhost:8080/v1/".into()),
        )
        .unwrap();
        let generator = OpenAiGenerator::new(&config, "local-model").unwrap();
        assert_eq!(generator.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_response_parsing() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Rust[1]"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content, "Rust[1]");
    }
}
