use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;
    let channel_handle = require("VIDLAB_CHANNEL_HANDLE")?;
    let youtube_api_key = require("VIDLAB_YOUTUBE_API_KEY")?;
    let gemini_api_key = require("VIDLAB_GEMINI_API_KEY")?;
    let image_search_api_key = require("VIDLAB_IMAGE_SEARCH_API_KEY")?;
    let image_search_engine_id = require("VIDLAB_IMAGE_SEARCH_ENGINE_ID")?;

    let env = parse_environment(&or_default("VIDLAB_ENV", "development"));
    let log_level = or_default("VIDLAB_LOG_LEVEL", "info");
    let gemini_model = or_default("VIDLAB_GEMINI_MODEL", "gemini-2.5-flash");
    let usage_file = PathBuf::from(or_default("VIDLAB_USAGE_FILE", "./gemini_usage"));

    let short_form_threshold_secs = parse_u64("VIDLAB_SHORT_FORM_THRESHOLD_SECS", "60")?;
    let discover_search_window = parse_u32("VIDLAB_DISCOVER_SEARCH_WINDOW", "10")?;
    let discover_batch_size = parse_usize("VIDLAB_DISCOVER_BATCH_SIZE", "3")?;

    let db_max_connections = parse_u32("VIDLAB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("VIDLAB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("VIDLAB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_request_timeout_secs = parse_u64("VIDLAB_HTTP_REQUEST_TIMEOUT_SECS", "30")?;
    let gemini_request_timeout_secs = parse_u64("VIDLAB_GEMINI_REQUEST_TIMEOUT_SECS", "300")?;

    let store_max_attempts = parse_u32("VIDLAB_STORE_MAX_ATTEMPTS", "3")?;
    let store_backoff_base_secs = parse_u64("VIDLAB_STORE_BACKOFF_BASE_SECS", "2")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        channel_handle,
        youtube_api_key,
        gemini_api_key,
        gemini_model,
        image_search_api_key,
        image_search_engine_id,
        usage_file,
        short_form_threshold_secs,
        discover_search_window,
        discover_batch_size,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_request_timeout_secs,
        gemini_request_timeout_secs,
        store_max_attempts,
        store_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
