//! API route configuration.

use crate::api::handlers::{analytics_handler, reconcile_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Versioned API routes, nested under `/api/v1`.
///
/// # Endpoints
///
/// - `POST /shorten`                - Create a short link
/// - `GET  /urls/{code}/analytics`  - Aggregate analytics for a link
/// - `POST /urls/{code}/reconcile`  - Fold pending lookups into the click count
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/urls/{code}/analytics", get(analytics_handler))
        .route("/urls/{code}/reconcile", post(reconcile_handler))
}
