//! Client for the Custom Search JSON API, used to find one representative
//! product image per report. Image lookup is best-effort enrichment: callers
//! treat `Ok(None)` and `Err` alike as "no image".

mod client;
mod error;

pub use client::ImageSearchClient;
pub use error::ImageSearchError;
