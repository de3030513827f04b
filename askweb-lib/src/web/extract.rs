use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{ElementRef, Html, Node};
use tracing::{debug, warn};

use crate::chunk::Document;
use crate::web::Extractor;
use crate::{Error, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/119.0.0.0 Safari/537.36 Edg/119.0.0.0";

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Elements whose text never reaches the reader
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Fetches pages over HTTP and keeps the text of their `<body>`.
pub struct HttpExtractor {
    client: Client,
    concurrency: usize,
}

impl HttpExtractor {
    pub fn new(concurrency: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            concurrency: concurrency.max(1),
        })
    }

    async fn fetch(&self, url: &str) -> Result<Document> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let text = html_to_text(&html);
        if text.is_empty() {
            return Err(Error::Extraction(format!("no text in body of {url}")));
        }
        debug!(url, chars = text.chars().count(), "scraped page");
        Ok(Document::new(url, text))
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, urls: &[String]) -> Vec<Document> {
        let fetches: Vec<_> = urls
            .iter()
            .map(|url| async move {
                match self.fetch(url).await {
                    Ok(document) => Some(document),
                    Err(e) => {
                        warn!(url = %url, error = %e, "skipping source");
                        None
                    }
                }
            })
            .collect();
        stream::iter(fetches)
                .buffered(self.concurrency)
            .filter_map(|document| async move { document })
            .collect()
            .await
    }
}

/// Visible text of an HTML page's body with whitespace runs collapsed.
///
/// The parser always synthesizes a `<body>`, so a bare fragment reads as
/// body text.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    for node in document.root_element().children() {
        if let Some(element) = ElementRef::wrap(node) {
            if element.value().name() == "body" {
                collect_text(element, &mut raw);
            }
        }
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if !SKIPPED_ELEMENTS.contains(&el.name()) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}
