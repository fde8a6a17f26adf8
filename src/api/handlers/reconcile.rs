//! Handler for on-demand click reconciliation.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::reconcile::ReconcileResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Folds the pending lookup counter of a link into its durable click count.
///
/// # Endpoint
///
/// `POST /api/v1/urls/{code}/reconcile`
///
/// # Errors
///
/// - 404 Not Found if the code does not exist
/// - 503 Service Unavailable if the counter or the store is down
pub async fn reconcile_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ReconcileResponse>, AppError> {
    let link = state.link_service.reconcile(&code).await?;

    Ok(Json(ReconcileResponse {
        code,
        click_count: link.click_count,
        last_accessed_at: link.last_accessed_at,
    }))
}
