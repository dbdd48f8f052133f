//! HTTP client for the Generative Language API's `generateContent` endpoint.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GeminiError;
use crate::types::{
    GenerateContentRequest, GenerateContentResponse, RequestContent, RequestGenerationConfig,
    RequestPart, Tool,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Model invocation knobs exposed to callers: sampling temperature and the
/// optional search-augmentation tool.
#[derive(Debug, Clone, Copy)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub google_search: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            google_search: true,
        }
    }
}

/// Client for the Generative Language API.
///
/// Use [`GeminiClient::new`] for production or
/// [`GeminiClient::with_base_url`] to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: Url,
    model: String,
}

impl GeminiClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeminiError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("vidlab/0.1 (channel-report-pipeline)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GeminiError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            model: model.to_owned(),
        })
    }

    /// Sends one prompt to the model and returns the reply's text.
    ///
    /// # Errors
    ///
    /// - [`GeminiError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeminiError::Deserialize`] if the response body does not match
    ///   the expected shape.
    /// - [`GeminiError::EmptyResponse`] if the reply holds no usable text.
    pub async fn generate_content(
        &self,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_owned(),
                }],
            }],
            generation_config: RequestGenerationConfig {
                temperature: config.temperature,
            },
            tools: if config.google_search {
                vec![Tool {
                    google_search: serde_json::Map::new(),
                }]
            } else {
                Vec::new()
            },
        };

        let url = self.build_url();
        let response = self.client.post(url.clone()).json(&request).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GeminiError::Deserialize {
                context: format!("generateContent({})", self.model),
                source: e,
            })?;

        parsed.into_text().ok_or(GeminiError::EmptyResponse)
    }

    /// Builds `{base}/v1beta/models/{model}:generateContent?key=…`.
    fn build_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("v1beta/models/{}:generateContent", self.model));
        url.query_pairs_mut().append_pair("key", &self.api_key);
        url
    }
}
