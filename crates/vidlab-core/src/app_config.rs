use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub channel_handle: String,
    pub youtube_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub image_search_api_key: String,
    pub image_search_engine_id: String,
    pub usage_file: PathBuf,
    pub short_form_threshold_secs: u64,
    pub discover_search_window: u32,
    pub discover_batch_size: usize,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_request_timeout_secs: u64,
    pub gemini_request_timeout_secs: u64,
    pub store_max_attempts: u32,
    pub store_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("channel_handle", &self.channel_handle)
            .field("database_url", &"[redacted]")
            .field("youtube_api_key", &"[redacted]")
            .field("gemini_api_key", &"[redacted]")
            .field("gemini_model", &self.gemini_model)
            .field("image_search_api_key", &"[redacted]")
            .field("image_search_engine_id", &self.image_search_engine_id)
            .field("usage_file", &self.usage_file)
            .field(
                "short_form_threshold_secs",
                &self.short_form_threshold_secs,
            )
            .field("discover_search_window", &self.discover_search_window)
            .field("discover_batch_size", &self.discover_batch_size)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_request_timeout_secs", &self.http_request_timeout_secs)
            .field(
                "gemini_request_timeout_secs",
                &self.gemini_request_timeout_secs,
            )
            .field("store_max_attempts", &self.store_max_attempts)
            .field("store_backoff_base_secs", &self.store_backoff_base_secs)
            .finish()
    }
}
