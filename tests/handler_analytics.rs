mod common;

use axum::{
    Router,
    routing::{get, post},
};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use common::TestContext;
use shortlink_lifecycle::api::handlers::{analytics_handler, reconcile_handler};
use shortlink_lifecycle::domain::entities::ClickMeta;
use shortlink_lifecycle::infrastructure::counter::ClickCounter;

fn server(ctx: &TestContext) -> TestServer {
    let app = Router::new()
        .route("/api/v1/urls/{code}/analytics", get(analytics_handler))
        .route("/api/v1/urls/{code}/reconcile", post(reconcile_handler))
        .with_state(ctx.state());

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_analytics_success() {
    let ctx = TestContext::new();
    let code = ctx.create("https://example.com/page").await;
    ctx.service
        .record_redirect_click(&code, ClickMeta::default())
        .await
        .unwrap();
    ctx.service.resolve_link(&code).await.unwrap();
    let server = server(&ctx);

    let response = server
        .get(&format!("/api/v1/urls/{code}/analytics"))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], code);
    assert_eq!(json["short_url"], format!("http://sho.rt/{code}"));
    assert_eq!(json["original_url"], "https://example.com/page");
    assert_eq!(json["click_count"], 1);
    assert_eq!(json["pending_lookups"], 1);
    assert!(json["last_accessed_at"].is_string());
}

#[tokio::test]
async fn test_analytics_not_found() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server.get("/api/v1/urls/missing/analytics").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_analytics_expired() {
    let ctx = TestContext::new();
    let code = ctx
        .create_expiring("https://example.com", Some(Utc::now() - Duration::minutes(1)))
        .await;
    let server = server(&ctx);

    let response = server
        .get(&format!("/api/v1/urls/{code}/analytics"))
        .await;

    assert_eq!(response.status_code(), 410);
}

#[tokio::test]
async fn test_reconcile_endpoint() {
    let ctx = TestContext::new();
    let code = ctx.create("https://example.com").await;
    ctx.counter.set(&code, 7);
    let server = server(&ctx);

    let response = server
        .post(&format!("/api/v1/urls/{code}/reconcile"))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], code);
    assert_eq!(json["click_count"], 7);
    assert!(json["last_accessed_at"].is_string());
    assert_eq!(ctx.counter.get(&code).await.unwrap(), 0);
}

#[tokio::test]
async fn test_reconcile_endpoint_not_found() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server.post("/api/v1/urls/missing/reconcile").await;

    response.assert_status_not_found();
}
