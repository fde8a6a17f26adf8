//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/v1/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/page",
///   "expires_at": "2030-01-01T00:00:00Z",  // optional
///   "owner": "alice"                        // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": 42,
///   "code": "g",
///   "short_url": "http://localhost:8080/g",
///   "original_url": "https://example.com/page",
///   "owner": "alice",
///   "expires_at": null,
///   "click_count": 0,
///   "created_at": "2025-03-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails and 503 if the store is down.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(payload.url, payload.expires_at, payload.owner)
        .await?;

    let code = link.code.clone().ok_or_else(|| {
        AppError::internal("Link stored without a short code", json!({ "id": link.id }))
    })?;
    let short_url = state.short_url(&code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::new(link, code, short_url)),
    ))
}
