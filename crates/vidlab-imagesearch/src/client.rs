//! HTTP client for the Custom Search JSON API.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ImageSearchError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
}

/// Client for image lookup through a Programmable Search Engine.
pub struct ImageSearchClient {
    client: Client,
    api_key: String,
    engine_id: String,
    base_url: Url,
}

impl ImageSearchClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ImageSearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, engine_id: &str, timeout_secs: u64) -> Result<Self, ImageSearchError> {
        Self::with_base_url(api_key, engine_id, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ImageSearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ImageSearchError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        engine_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ImageSearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("vidlab/0.1 (channel-report-pipeline)")
            .build()?;

        let base_url = Url::parse(base_url)
            .map_err(|e| ImageSearchError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            engine_id: engine_id.to_owned(),
            base_url,
        })
    }

    /// Finds the first image result for `query`, or `None` when the query is
    /// blank or the search returns no items.
    ///
    /// # Errors
    ///
    /// - [`ImageSearchError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ImageSearchError::Deserialize`] if the response body does not
    ///   match the expected shape.
    pub async fn find_product_image(&self, query: &str) -> Result<Option<String>, ImageSearchError> {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("empty image query, skipping lookup");
            return Ok(None);
        }

        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("cx", &self.engine_id)
            .append_pair("q", query)
            .append_pair("searchType", "image")
            .append_pair("num", "1");

        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ImageSearchError::Deserialize {
                context: format!("customsearch({query})"),
                source: e,
            })?;

        Ok(parsed.items.into_iter().next().map(|item| item.link))
    }
}
