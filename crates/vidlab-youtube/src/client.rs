//! HTTP client for the `YouTube` Data API v3.
//!
//! Wraps `reqwest` with typed response deserialization and the short-form
//! filter. Discovery callers only ever see [`DiscoveredVideo`] lists that
//! have already been duration-filtered.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::duration::{is_short_form, parse_iso8601_secs};
use crate::error::YoutubeError;
use crate::types::{DiscoveredVideo, SearchResponse, VideoListResponse};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// The `videos` endpoint accepts at most 50 ids per request.
const MAX_IDS_PER_REQUEST: usize = 50;

/// Client for the `YouTube` Data API v3.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl YoutubeClient {
    /// Creates a new client pointed at the production Data API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, YoutubeError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`YoutubeError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("vidlab/0.1 (channel-report-pipeline)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| YoutubeError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Resolves a channel handle (e.g. `@certified-labs`) to a channel id.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::ApiError`] if no channel matches the handle.
    /// - [`YoutubeError::Http`] on network failure or non-2xx HTTP status.
    /// - [`YoutubeError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn resolve_channel_id(&self, handle: &str) -> Result<String, YoutubeError> {
        let query = handle.trim_start_matches('@');
        let url = self.build_url(
            "search",
            &[
                ("part", "snippet"),
                ("q", query),
                ("type", "channel"),
                ("maxResults", "1"),
            ],
        );
        let response: SearchResponse = self.request_json(&url).await?;

        response
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet.channel_id)
            .ok_or_else(|| YoutubeError::ApiError(format!("no channel found for handle {handle}")))
    }

    /// Lists the channel's most recent long-form uploads, newest first.
    ///
    /// Fetches up to `search_window` candidates, looks up their durations,
    /// and drops short-form items (duration at or below `threshold_secs`).
    ///
    /// # Errors
    ///
    /// Propagates [`YoutubeError`] from either underlying API call.
    pub async fn recent_long_form(
        &self,
        channel_id: &str,
        search_window: u32,
        threshold_secs: u64,
    ) -> Result<Vec<DiscoveredVideo>, YoutubeError> {
        let page = self.search_page(channel_id, search_window, None).await?;
        self.filter_long_form(channel_id, page, threshold_secs).await
    }

    /// Pages through the channel's entire upload history, newest first,
    /// returning every long-form video. Used by backfill.
    ///
    /// # Errors
    ///
    /// Propagates [`YoutubeError`] from any underlying API call.
    pub async fn all_long_form(
        &self,
        channel_id: &str,
        threshold_secs: u64,
    ) -> Result<Vec<DiscoveredVideo>, YoutubeError> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .search_page(channel_id, 50, page_token.as_deref())
                .await?;
            let next = page.next_page_token.clone();
            let mut batch = self
                .filter_long_form(channel_id, page, threshold_secs)
                .await?;
            videos.append(&mut batch);

            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
            tracing::debug!(count = videos.len(), "fetched long-form videos so far");
        }

        Ok(videos)
    }

    /// Fetches one date-ordered page of the channel's uploads.
    async fn search_page(
        &self,
        channel_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<SearchResponse, YoutubeError> {
        let max_results = max_results.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("channelId", channel_id),
            ("maxResults", max_results.as_str()),
            ("order", "date"),
            ("type", "video"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let url = self.build_url("search", &params);
        self.request_json(&url).await
    }

    /// Looks up durations for the page's videos and keeps the long-form ones.
    ///
    /// A video the `videos` endpoint did not return is treated as duration 0
    /// and therefore excluded.
    async fn filter_long_form(
        &self,
        channel_id: &str,
        page: SearchResponse,
        threshold_secs: u64,
    ) -> Result<Vec<DiscoveredVideo>, YoutubeError> {
        let candidates: Vec<(String, chrono::DateTime<chrono::Utc>)> = page
            .items
            .into_iter()
            .filter_map(|item| {
                item.id
                    .video_id
                    .map(|video_id| (video_id, item.snippet.published_at))
            })
            .collect();

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = candidates.iter().map(|(id, _)| id.clone()).collect();
        let durations = self.video_durations(&ids).await?;

        let mut videos = Vec::new();
        for (video_id, published_at) in candidates {
            let duration_secs = durations.get(&video_id).copied().unwrap_or(0);
            if is_short_form(duration_secs, threshold_secs) {
                tracing::debug!(%video_id, duration_secs, "skipping short-form video");
                continue;
            }
            videos.push(DiscoveredVideo {
                video_url: format!("https://www.youtube.com/watch?v={video_id}"),
                video_id,
                channel_id: channel_id.to_owned(),
                published_at,
            });
        }

        Ok(videos)
    }

    /// Fetches durations (in seconds) for the given video ids, chunked to the
    /// API's 50-id limit.
    async fn video_durations(
        &self,
        video_ids: &[String],
    ) -> Result<HashMap<String, u64>, YoutubeError> {
        let mut durations = HashMap::with_capacity(video_ids.len());

        for chunk in video_ids.chunks(MAX_IDS_PER_REQUEST) {
            let joined = chunk.join(",");
            let url = self.build_url("videos", &[("part", "contentDetails"), ("id", &joined)]);
            let response: VideoListResponse = self.request_json(&url).await?;
            for item in response.items {
                durations.insert(item.id, parse_iso8601_secs(&item.content_details.duration));
            }
        }

        Ok(durations)
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters, always appending the API key.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint);
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and deserializes the
    /// response body.
    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
    ) -> Result<T, YoutubeError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> YoutubeClient {
        YoutubeClient::with_base_url("test-key", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_appends_endpoint_and_key() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        let url = client.build_url("search", &[("type", "video")]);
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/search?key=test-key&type=video"
        );
    }

    #[test]
    fn build_url_encodes_special_characters() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        let url = client.build_url("search", &[("q", "certified labs")]);
        assert!(
            url.as_str().contains("certified+labs") || url.as_str().contains("certified%20labs"),
            "query param should be percent-encoded: {url}"
        );
    }
}
