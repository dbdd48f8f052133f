//! Integration tests for the model client and the report pipeline against a
//! mock HTTP server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidlab_gemini::usage::UsageCounter;
use vidlab_gemini::{GeminiClient, GeminiError, GenerationConfig, ReportGenerator};

const MODEL: &str = "gemini-2.5-flash";
const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::with_base_url("test-key", MODEL, 30, &server.uri())
        .expect("client should build against the mock server")
}

fn model_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn generate_content_returns_reply_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply("hello")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client
        .generate_content("say hello", GenerationConfig::default())
        .await
        .expect("generation should succeed");
    assert_eq!(text, "hello");
}

#[tokio::test]
async fn empty_candidates_is_an_empty_response_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .generate_content("anything", GenerationConfig::default())
        .await
        .expect_err("empty reply should fail");
    assert!(matches!(err, GeminiError::EmptyResponse));
}

#[tokio::test]
async fn server_error_surfaces_as_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .generate_content("anything", GenerationConfig::default())
        .await
        .expect_err("500 should fail");
    assert!(matches!(err, GeminiError::Http(_)));
}

#[tokio::test]
async fn report_generator_extracts_reports_and_counts_usage() {
    let server = MockServer::start().await;
    let reply = "```json\n[{\"product_id\": \"A\"}, {\"product_id\": \"B\"}]\n```";
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let usage = UsageCounter::new(dir.path().join("usage"));
    let generator = ReportGenerator::new(client_for(&server), usage.clone());

    let reports = generator
        .generate("https://www.youtube.com/watch?v=abc123")
        .await
        .expect("generation should succeed");

    assert_eq!(reports.len(), 2);
    assert_eq!(
        reports[0].get("product_id").and_then(|v| v.as_str()),
        Some("A")
    );
    assert_eq!(usage.read(), 1);
}

#[tokio::test]
async fn usage_counts_the_attempt_even_when_the_model_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let usage = UsageCounter::new(dir.path().join("usage"));
    let generator = ReportGenerator::new(client_for(&server), usage.clone());

    let result = generator.generate("https://www.youtube.com/watch?v=x").await;
    assert!(result.is_err());
    assert_eq!(usage.read(), 1, "failed calls still consume quota");
}

#[tokio::test]
async fn prose_only_reply_is_a_no_reports_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            "I could not access the video, sorry.",
        )))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let usage = UsageCounter::new(dir.path().join("usage"));
    let generator = ReportGenerator::new(client_for(&server), usage);

    let err = generator
        .generate("https://www.youtube.com/watch?v=x")
        .await
        .expect_err("prose reply should fail extraction");
    assert!(matches!(err, GeminiError::NoReports));
}
