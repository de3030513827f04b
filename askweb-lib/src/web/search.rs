use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Config, QueryOptions};
use crate::web::SearchProvider;
use crate::{Error, Result};

const GOOGLE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Google Programmable Search (Custom Search JSON API).
pub struct GoogleSearch {
    client: Client,
    api_key: String,
    engine_id: String,
}

impl GoogleSearch {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_key: config.search_api_key.clone(),
            engine_id: config.search_engine_id.clone(),
        })
    }

    fn request_url(&self, query: &str, options: &QueryOptions) -> String {
        let mut url = format!(
            "{}?key={}&cx={}&q={}&safe=active",
            GOOGLE_SEARCH_ENDPOINT,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.engine_id),
            urlencoding::encode(query)
        );
        if let Some(days) = options.date_restrict_days() {
            url.push_str(&format!("&dateRestrict={days}"));
        }
        if let Some(site) = options.site() {
            url.push_str(&format!(
                "&siteSearch={}&siteSearchFilter=i",
                urlencoding::encode(site)
            ));
        }
        url
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str, options: &QueryOptions) -> Result<Vec<String>> {
        debug!(query, "searching the web");
        let response = self
            .client
            .get(self.request_url(query, options))
            .send()
            .await?;

        // error payloads carry the useful message, so parse before checking status
        let status = response.status();
        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body).map_err(|e| {
            Error::Search(format!("unreadable search response ({status}): {e}"))
        })?;

        parse_search_response(query, &payload)
    }
}

/// Pull result links out of a Custom Search response.
pub fn parse_search_response(query: &str, payload: &Value) -> Result<Vec<String>> {
    if let Some(error) = payload.get("error") {
        return Err(Error::Search(format!("search API returned an error: {error}")));
    }

    let Some(information) = payload.get("searchInformation") else {
        return Err(Error::Search(format!(
            "no search information in search API response: {payload}"
        )));
    };

    // totalResults is a string in the real API
    let total = match information.get("totalResults") {
        Some(Value::String(s)) => s.parse::<u64>().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    };
    if total == 0 {
        warn!(query, "no results found");
        return Ok(Vec::new());
    }

    let items = match payload.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => {
            warn!(query, "no result items in the response");
            return Ok(Vec::new());
        }
    };

    let mut links = Vec::with_capacity(items.len());
    for item in items {
        match item.get("link").and_then(Value::as_str) {
            Some(link) if !link.is_empty() => links.push(link.to_string()),
            _ => warn!(%item, "search result link missing"),
        }
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn google() -> GoogleSearch {
        let config = Config::new(
            Some("key 1".into()),
            Some("cx".into()),
            Some("llm".into()),
            None,
        )
        .unwrap();
        GoogleSearch::new(&config).unwrap()
    }

    #[test]
    fn test_request_url_without_restrictions() {
        let url = google().request_url("rust async", &QueryOptions::default());
        assert_eq!(
            url,
            "https://www.googleapis.com/customsearch/v1?key=key%201&cx=cx&q=rust%20async&safe=active"
        );
    }

    #[test]
    fn test_request_url_with_restrictions() {
        let options = QueryOptions {
            date_restrict: Some(30),
            target_site: Some("docs.rs".into()),
            ..QueryOptions::default()
        };
        let url = google().request_url("serde", &options);
        assert!(url.ends_with("&dateRestrict=30&siteSearch=docs.rs&siteSearchFilter=i"));
    }

    #[test]
    fn test_parse_links_in_order() {
        let payload = json!({
            "searchInformation": {"totalResults": "3"},
            "items": [
                {"link": "https://a.example"},
                {"title": "no link here"},
                {"link": ""},
                {"link": "https://b.example"}
            ]
        });
        let links = parse_search_response("q", &payload).unwrap();
        assert_eq!(links, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_parse_zero_results() {
        let payload = json!({"searchInformation": {"totalResults": "0"}});
        assert!(parse_search_response("q", &payload).unwrap().is_empty());
    }

    #[test]
    fn test_parse_missing_items() {
        let payload = json!({"searchInformation": {"totalResults": "12"}});
        assert!(parse_search_response("q", &payload).unwrap().is_empty());
    }

    #[test]
    fn test_parse_api_error() {
        let payload = json!({"error": {"code": 403, "message": "quota"}});
        let err = parse_search_response("q", &payload).unwrap_err();
        assert!(matches!(err, Error::Search(_)));
        assert!(err.to_string().contains("quota"));
    }

    #[test]
    fn test_parse_missing_search_information() {
        let payload = json!({"kind": "customsearch#search"});
        assert!(matches!(
            parse_search_response("q", &payload),
            Err(Error::Search(_))
        ));
    }
}
