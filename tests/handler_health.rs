mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use common::TestContext;
use shortlink_lifecycle::api::handlers::health_handler;

#[tokio::test]
async fn test_health_endpoint_success() {
    let ctx = TestContext::new();
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(ctx.state());

    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["counter"]["status"], "ok");
    assert!(json.get("version").is_some());
}
