//! Client for the `YouTube` Data API v3: channel resolution, upload listing,
//! duration lookup, and short-form filtering.

mod client;
pub mod duration;
mod error;
mod types;

pub use client::YoutubeClient;
pub use error::YoutubeError;
pub use types::DiscoveredVideo;
