//! Handler for per-link analytics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::analytics::AnalyticsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns aggregate analytics for a short link.
///
/// # Endpoint
///
/// `GET /api/v1/urls/{code}/analytics`
///
/// # Errors
///
/// Returns 404 for unknown codes and 410 for expired links.
pub async fn analytics_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let analytics = state.link_service.get_analytics(&code).await?;
    let short_url = state.short_url(&code);

    Ok(Json(AnalyticsResponse::new(analytics, short_url)))
}
