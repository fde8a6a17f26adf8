mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use common::{MockConnectInfoLayer, TestContext};
use shortlink_lifecycle::api::handlers::redirect_handler;
use shortlink_lifecycle::domain::repositories::LinkRepository;
use shortlink_lifecycle::infrastructure::counter::ClickCounter;

fn server(ctx: &TestContext) -> TestServer {
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .layer(MockConnectInfoLayer)
        .with_state(ctx.state());

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_redirect_success() {
    let ctx = TestContext::new();
    let code = ctx.create("https://example.com/target").await;
    let server = server(&ctx);

    let response = server
        .get(&format!("/{code}"))
        .add_header("User-Agent", "integration-test")
        .add_header("Referer", "https://news.example.com")
        .await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_records_click_and_lookup() {
    let ctx = TestContext::new();
    let code = ctx.create("https://example.com").await;
    let server = server(&ctx);

    server.get(&format!("/{code}")).await;
    server.get(&format!("/{code}")).await;

    let link = ctx.repo.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(link.click_count, 2);
    assert_eq!(ctx.repo.count_clicks(link.id).await.unwrap(), 2);
    assert_eq!(ctx.counter.get(&code).await.unwrap(), 2);
}

#[tokio::test]
async fn test_redirect_counts_twice_once_reconciled() {
    let ctx = TestContext::new();
    let code = ctx.create("https://example.com").await;
    let server = server(&ctx);

    server.get(&format!("/{code}")).await;
    ctx.service.reconcile(&code).await.unwrap();

    // One durable click plus one reconciled lookup.
    let analytics = ctx.service.get_analytics(&code).await.unwrap();
    assert_eq!(analytics.click_count, 2);
    assert_eq!(analytics.pending_lookups, 0);

    let link = ctx.repo.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(ctx.repo.count_clicks(link.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server.get("/nonexistent").await;

    response.assert_status_not_found();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_expired_link() {
    let ctx = TestContext::new();
    let code = ctx
        .create_expiring(
            "https://example.com/old",
            Some(Utc::now() - Duration::hours(1)),
        )
        .await;
    let server = server(&ctx);

    let response = server.get(&format!("/{code}")).await;

    assert_eq!(response.status_code(), 410);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "expired");

    let link = ctx.repo.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(link.click_count, 0);
    assert_eq!(ctx.repo.count_clicks(link.id).await.unwrap(), 0);
}
