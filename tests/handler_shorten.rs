mod common;

use axum::{Router, routing::post};
use axum_test::TestServer;
use common::TestContext;
use serde_json::json;
use shortlink_lifecycle::api::handlers::shorten_handler;

fn server(ctx: &TestContext) -> TestServer {
    let app = Router::new()
        .route("/api/v1/shorten", post(shorten_handler))
        .with_state(ctx.state());

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_shorten_success() {
    let ctx = TestContext::with_first_id(42);
    let server = server(&ctx);

    let response = server
        .post("/api/v1/shorten")
        .json(&json!({
            "url": "https://example.com/a",
            "owner": "alice"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["id"], 42);
    assert_eq!(json["code"], "g");
    assert_eq!(json["short_url"], "http://sho.rt/g");
    assert_eq!(json["original_url"], "https://example.com/a");
    assert_eq!(json["owner"], "alice");
    assert_eq!(json["click_count"], 0);
    assert!(json["expires_at"].is_null());
    assert!(json["created_at"].is_string());
}

#[tokio::test]
async fn test_shorten_with_expiry() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/api/v1/shorten")
        .json(&json!({
            "url": "https://example.com",
            "expires_at": "2099-01-01T00:00:00Z"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    assert!(json["expires_at"].as_str().unwrap().starts_with("2099-01-01"));
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/api/v1/shorten")
        .json(&json!({ "url": "not-a-valid-url" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(ctx.repo.is_empty());
}

#[tokio::test]
async fn test_shorten_rejects_non_http_scheme() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .post("/api/v1/shorten")
        .json(&json!({ "url": "ftp://example.com/file" }))
        .await;

    response.assert_status_bad_request();
    assert!(ctx.repo.is_empty());
}
