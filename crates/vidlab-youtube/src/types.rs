//! Typed response shapes for the `YouTube` Data API v3.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A candidate video produced by discovery, already duration-filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredVideo {
    pub video_id: String,
    pub video_url: String,
    pub channel_id: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub id: SearchItemId,
    pub snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItemId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchSnippet {
    #[serde(rename = "channelId")]
    pub channel_id: String,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoListItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListItem {
    pub id: String,
    #[serde(rename = "contentDetails")]
    pub content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentDetails {
    pub duration: String,
}
