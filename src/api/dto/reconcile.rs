//! DTOs for the reconcile endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Click totals after folding the lookup counter into the store.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub code: String,
    pub click_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}
