//! Offline unit tests for vidlab-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use vidlab_core::{AppConfig, Environment};
use vidlab_db::{ImageStatus, NewReport, NewVideo, PoolConfig, VideoRow};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        channel_handle: "@certified-labs".to_string(),
        youtube_api_key: "yt".to_string(),
        gemini_api_key: "gm".to_string(),
        gemini_model: "gemini-2.5-flash".to_string(),
        image_search_api_key: "cs".to_string(),
        image_search_engine_id: "cx".to_string(),
        usage_file: PathBuf::from("./gemini_usage"),
        short_form_threshold_secs: 60,
        discover_search_window: 10,
        discover_batch_size: 3,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        http_request_timeout_secs: 30,
        gemini_request_timeout_secs: 300,
        store_max_attempts: 3,
        store_backoff_base_secs: 2,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn retry_settings_from_app_config_uses_core_values() {
    let settings = vidlab_db::RetrySettings::from_app_config(&app_config());
    assert_eq!(settings.max_attempts, 3);
    assert_eq!(settings.base_delay, std::time::Duration::from_secs(2));
}

/// Compile-time smoke test: confirm that [`VideoRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn video_row_has_expected_fields() {
    use chrono::Utc;

    let row = VideoRow {
        id: 1_i64,
        video_id: "dQw4w9WgXcQ".to_string(),
        video_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
        channel_id: "UC123".to_string(),
        published_at: Utc::now(),
        status: "pending".to_string(),
        retry_count: 0_i32,
        last_attempt_at: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.status, "pending");
    assert_eq!(row.retry_count, 0);
    assert!(row.last_attempt_at.is_none());
}

#[test]
fn new_report_id_convention_is_video_id_plus_index() {
    let video = NewVideo {
        video_id: "abc123".to_string(),
        video_url: "https://www.youtube.com/watch?v=abc123".to_string(),
        channel_id: "UC123".to_string(),
        published_at: chrono::Utc::now(),
    };
    // The orchestrator derives report ids from the video's database id and
    // the product index within the extraction result.
    let report = NewReport {
        id: "17_0".to_string(),
        video_id: 17,
        video_url: video.video_url.clone(),
        results: serde_json::json!({ "product_id": "ACMEWHEY" }),
        product_id: Some("ACMEWHEY".to_string()),
        product_name: Some("Acme Whey".to_string()),
        product_category: Some("Whey Concentrate".to_string()),
        company: None,
        verdict: "pass",
    };

    assert_eq!(report.id, "17_0");
    assert_eq!(report.video_id, 17);
    assert_eq!(report.verdict, "pass");
}

#[test]
fn image_status_labels() {
    assert_eq!(ImageStatus::Pending.as_str(), "pending");
    assert_eq!(ImageStatus::Completed.as_str(), "completed");
    assert_eq!(ImageStatus::Failed.as_str(), "failed");
}
