//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::warn;

use crate::domain::Resolution;
use crate::domain::entities::ClickMeta;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code (cache value, always confirmed against the store)
/// 2. Record a durable click with client IP, user agent and referrer
/// 3. Return 307 Temporary Redirect
///
/// A failed click write is logged and does not block the redirect.
///
/// # Errors
///
/// - 404 Not Found if the code does not exist
/// - 410 Gone if the link has expired
/// - 503 Service Unavailable if the store cannot be reached
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let target = match state.link_service.resolve_link(&code).await? {
        Resolution::Found(target) => target,
        Resolution::NotFound => {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }
        Resolution::Expired => {
            return Err(AppError::expired(
                "This short URL has expired",
                json!({ "code": code }),
            ));
        }
    };

    let meta = ClickMeta::new(
        Some(addr.ip().to_string()),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    if let Err(e) = state.link_service.record_redirect_click(&code, meta).await {
        warn!(code = %code, error = %e, "Failed to record redirect click");
    }

    Ok(Redirect::temporary(&target))
}
