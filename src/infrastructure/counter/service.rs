//! Click counter trait.

use async_trait::async_trait;

use crate::infrastructure::cache::CacheResult;

/// Best-effort, TTL-less lookup counter per short code.
///
/// Counts resolutions cheaply so the hot read path never writes to the link
/// store. The accumulated delta is folded into the durable click count by
/// reconciliation, which takes away only the delta it applied
/// ([`ClickCounter::subtract`]). [`ClickCounter::reset`] drops the counter of
/// a link that no longer exists.
///
/// # Implementations
///
/// - [`crate::infrastructure::counter::RedisClickCounter`] - Redis `INCR` counters
/// - [`crate::infrastructure::counter::MemoryCounter`] - in-process counters
/// - [`crate::infrastructure::counter::NullCounter`] - counts nothing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickCounter: Send + Sync {
    /// Atomically adds one to the counter and returns the new value.
    async fn increment(&self, short_code: &str) -> CacheResult<i64>;

    /// Current delta; zero when the counter is absent.
    async fn get(&self, short_code: &str) -> CacheResult<i64>;

    /// Atomically takes `delta` off the counter and returns what is left.
    ///
    /// Increments that arrived after the delta was read survive. The counter
    /// is removed once it reaches zero.
    async fn subtract(&self, short_code: &str, delta: i64) -> CacheResult<i64>;

    /// Clears the counter.
    async fn reset(&self, short_code: &str) -> CacheResult<()>;

    /// Short codes that currently hold a counter.
    async fn pending_codes(&self) -> CacheResult<Vec<String>>;

    /// Checks if the counter backend is healthy.
    async fn health_check(&self) -> bool;
}
