use thiserror::Error;

/// Errors returned by the model client and the report pipeline. The
/// orchestrator treats every variant as "generation failed" for the current
/// video; the distinctions exist for logging.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The client could not be constructed or the API rejected the request
    /// at the application level.
    #[error("Gemini API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model replied but produced no usable text.
    #[error("model response contained no usable text")]
    EmptyResponse,

    /// No structured reports could be extracted from the model's text.
    #[error("no reports extracted from model output")]
    NoReports,
}
