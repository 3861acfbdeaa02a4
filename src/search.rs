//! Keyword search over an external HTTP endpoint.
//!
//! Speaks the Google Custom Search JSON shape: `GET endpoint?key&cx&q`
//! answering `{ "items": [{ title, link, displayLink, snippet }] }` or
//! `{ "error": { "message": .. } }`.

use crate::config::SearchConfig;
use crate::notification::Notification;
use crate::trace_debug;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, rename = "displayLink")]
    pub display_link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Notification shown after a successful search
    pub fn notification(&self) -> Notification {
        Notification::info("Search completed", format!("Found {} results", self.len()))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Please enter a search query")]
    EmptyQuery,
    #[error("Search API key is not configured")]
    MissingApiKey,
    #[error("Invalid search endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
    #[error("Unexpected search response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SearchError {
    /// Notification shown when a search fails
    pub fn notification(&self) -> Notification {
        match self {
            Self::EmptyQuery => Notification::error("Query required", self.to_string()),
            _ => Notification::error("Search failed", self.to_string()),
        }
    }
}

/// Client for the keyword search endpoint
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    engine_id: String,
}

impl SearchClient {
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Result<Self, SearchError> {
        Self::with_timeout(endpoint, api_key, engine_id, Duration::from_secs(15))
    }

    pub fn with_timeout(
        endpoint: &str,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        })
    }

    /// Build a client from configuration, honouring the API key override
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::with_timeout(
            &config.endpoint,
            config.effective_api_key(),
            config.engine_id.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Full request URL for `query`
    pub fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            if !self.engine_id.is_empty() {
                pairs.append_pair("cx", &self.engine_id);
            }
            pairs.append_pair("q", query);
        }
        url
    }

    /// Run a keyword search
    pub async fn search(&self, query: &str) -> Result<SearchResults, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if self.api_key.is_empty() {
            return Err(SearchError::MissingApiKey);
        }

        trace_debug!(endpoint = %self.endpoint, query, "sending search request");
        let body = self
            .http
            .get(self.request_url(query))
            .send()
            .await?
            .text()
            .await?;

        let results = parse_response(&body)?;
        trace_debug!(count = results.len(), "search completed");
        Ok(results)
    }
}

/// Decode a search response body, turning API error payloads into errors
pub fn parse_response(body: &str) -> Result<SearchResults, SearchError> {
    if let Ok(err) = serde_json::from_str::<ApiErrorBody>(body) {
        let message = if err.error.message.is_empty() {
            "Failed to get search results".to_string()
        } else {
            err.error.message
        };
        return Err(SearchError::Api(message));
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_query() {
        let client = SearchClient::new("https://search.example.com/v1", "k3y", "engine")
            .expect("valid client");
        let url = client.request_url("rust & tokio");
        assert_eq!(
            url.as_str(),
            "https://search.example.com/v1?key=k3y&cx=engine&q=rust+%26+tokio"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            SearchClient::new("not a url", "k", "cx"),
            Err(SearchError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_error_notifications() {
        let n = SearchError::EmptyQuery.notification();
        assert_eq!(n.title, "Query required");
        assert_eq!(n.description, "Please enter a search query");
        assert!(n.is_error());
        let n = SearchError::Api("quota exceeded".into()).notification();
        assert_eq!(n.title, "Search failed");
        assert_eq!(n.description, "quota exceeded");
    }
}
