//! Values produced by the link lifecycle operations.

use chrono::{DateTime, Utc};

use crate::domain::entities::Link;

/// Outcome of resolving a short code.
///
/// `NotFound` and `Expired` are ordinary answers, not failures: callers branch
/// on them. Store failures travel separately as `Err(AppError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The link is live; carries the target URL.
    Found(String),
    /// No link with this code exists, whatever the cache says.
    NotFound,
    /// The link exists but its expiry has passed.
    Expired,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// Target URL for a live link.
    pub fn target(&self) -> Option<&str> {
        match self {
            Resolution::Found(target) => Some(target),
            _ => None,
        }
    }
}

/// Result of one expiry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Links examined.
    pub scanned: u64,
    /// Expired links deleted together with their clicks.
    pub deleted: u64,
    /// Code-less rows removed by the orphan purge.
    pub orphans_purged: u64,
}

/// Result of a batch reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Codes whose delta was folded into the durable click count.
    pub reconciled: u64,
    /// Codes that failed and were left for the next run.
    pub failed: u64,
    /// Sum of the deltas applied.
    pub clicks_applied: i64,
}

/// Aggregate analytics for a single link.
///
/// `click_count` folds together two sources: one durable click per served
/// redirect, plus every reconciled lookup. A redirect also counts as a
/// lookup, so once reconciled a single visit through `GET /{code}` adds two.
/// The total tracks traffic volume, not unique visits.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnalytics {
    pub code: String,
    pub target_url: String,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Durable clicks plus reconciled lookups.
    pub click_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Lookups counted since the last reconciliation and not yet durable.
    pub pending_lookups: i64,
}

impl LinkAnalytics {
    pub fn from_link(link: Link, code: String, pending_lookups: i64) -> Self {
        Self {
            code,
            target_url: link.target_url,
            owner: link.owner,
            created_at: link.created_at,
            expires_at: link.expires_at,
            click_count: link.click_count,
            last_accessed_at: link.last_accessed_at,
            pending_lookups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_target() {
        let found = Resolution::Found("https://example.com".to_string());

        assert!(found.is_found());
        assert_eq!(found.target(), Some("https://example.com"));
        assert_eq!(Resolution::NotFound.target(), None);
        assert!(!Resolution::Expired.is_found());
    }
}
