mod common;

use common::TestApp;
use genai_relay::services::providers::mock::MockTextProvider;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn generate_text_returns_model_output() {
    let app = TestApp::spawn(MockTextProvider::replying("Hi there")).await;

    let response = app
        .client
        .post(app.url("/generate-text"))
        .json(&json!({ "message": "Hello" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "output": "Hi there" }));

    let calls = app.provider.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "Hello");
    assert!(calls[0].attachment.is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn generate_text_without_message_is_rejected_before_reaching_the_model() {
    let app = TestApp::spawn(MockTextProvider::replying("unused")).await;

    let response = app
        .client
        .post(app.url("/generate-text"))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "error": "Prompt is required" }));
    assert!(app.provider.calls().await.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn generate_text_treats_empty_message_as_missing() {
    let app = TestApp::spawn(MockTextProvider::replying("unused")).await;

    let response = app
        .client
        .post(app.url("/generate-text"))
        .json(&json!({ "message": "" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.provider.calls().await.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn generate_text_with_non_json_body_is_a_client_error() {
    let app = TestApp::spawn(MockTextProvider::replying("unused")).await;

    let response = app
        .client
        .post(app.url("/generate-text"))
        .header("content-type", "text/plain")
        .body("Hello")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Prompt is required");

    app.cleanup().await;
}

#[tokio::test]
async fn generate_text_reports_provider_failure_as_server_error() {
    let app = TestApp::spawn(MockTextProvider::failing("quota exceeded")).await;

    let response = app
        .client
        .post(app.url("/generate-text"))
        .json(&json!({ "message": "Hello" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let error = body["error"].as_str().expect("error should be a string");
    assert!(error.contains("quota exceeded"), "unexpected error: {}", error);
    assert!(body.get("output").is_none());

    app.cleanup().await;
}
