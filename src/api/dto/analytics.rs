//! DTOs for link analytics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::LinkAnalytics;

/// Aggregate analytics for a short link.
///
/// `click_count` is the durable total; `pending_lookups` are resolutions
/// counted since the last reconciliation.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub code: String,
    pub short_url: String,
    pub original_url: String,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub pending_lookups: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl AnalyticsResponse {
    pub fn new(analytics: LinkAnalytics, short_url: String) -> Self {
        Self {
            code: analytics.code,
            short_url,
            original_url: analytics.target_url,
            owner: analytics.owner,
            created_at: analytics.created_at,
            expires_at: analytics.expires_at,
            click_count: analytics.click_count,
            pending_lookups: analytics.pending_lookups,
            last_accessed_at: analytics.last_accessed_at,
        }
    }
}
