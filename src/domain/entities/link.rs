//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL with its aggregate analytics.
///
/// `code` is `None` only between the two creation writes: the row is inserted
/// first to obtain `id`, then the code derived from `id` is stored. A link
/// without a code is never resolvable.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub code: Option<String>,
    pub target_url: String,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub click_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Creates a new Link instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        code: Option<String>,
        target_url: String,
        owner: Option<String>,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        click_count: i64,
        last_accessed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            code,
            target_url,
            owner,
            created_at,
            expires_at,
            click_count,
            last_accessed_at,
        }
    }

    /// Returns true while the short code has not been assigned yet.
    pub fn is_pending(&self) -> bool {
        self.code.is_none()
    }

    /// Returns true if the link is no longer servable at `now`.
    ///
    /// A link whose expiry equals `now` is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e <= now)
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if the expiry sweep should remove the link at `now`.
    ///
    /// Only expiries strictly before `now` qualify.
    pub fn is_sweepable_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e < now)
    }
}

/// Input data for the first creation write.
///
/// The short code is absent on purpose: it is derived from the id the store
/// assigns to this row.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub target_url: String,
    pub owner: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}
