//! Typed request/response shapes for `generateContent`.
//!
//! The wire response is reduced to a single text string by
//! [`GenerateContentResponse::into_text`]; nothing downstream ever probes
//! alternative response shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: RequestGenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestGenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct Tool {
    #[serde(rename = "google_search")]
    pub google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Part {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Joins the first candidate's text parts, or `None` when the reply holds
    /// no usable text.
    pub(crate) fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
