//! Repository trait for the durable link store.

use crate::domain::entities::{Click, Link, NewClick, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable store of links and their click events.
///
/// This is the single source of truth for existence and expiry. Every
/// mutation of a link's counters must be applied atomically by the store
/// itself; callers never read-modify-write a click total in memory.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Errors
///
/// Any store failure is reported as [`AppError::StoreUnavailable`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync + 'static {
    /// Inserts a link without a short code and returns it with its new id.
    ///
    /// The click count starts at zero.
    async fn insert_pending(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Stores the short code for a pending link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no pending link with `id` exists (the
    /// row is gone or already has a code). Returns [`AppError::Conflict`] if
    /// `code` is taken by another link.
    async fn assign_code(&self, id: i64, code: &str) -> Result<Link, AppError>;

    /// Finds a link by its short code. Pending links are never returned.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Returns true if a link with this short code exists.
    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError>;

    /// Records one redirect: inserts the click event, increments the link's
    /// click count by one and sets `last_accessed_at` to the click time, all
    /// in one atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link no longer exists.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Adds `delta` to the click count and sets `last_accessed_at = now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link no longer exists.
    async fn update_click_stats(
        &self,
        id: i64,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<Link, AppError>;

    /// Deletes a link and, with it, all of its click events.
    ///
    /// Returns `Ok(false)` if the link was already gone.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Returns up to `limit` links with `id > after_id`, ordered by id.
    ///
    /// Keyset paging keeps a full scan stable while rows are being deleted.
    async fn list_page(&self, after_id: i64, limit: i64) -> Result<Vec<Link>, AppError>;

    /// Deletes links that never received a short code and were created
    /// before `cutoff`. Returns the number of rows removed.
    async fn purge_orphans(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;

    /// Counts the click events stored for a link.
    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
