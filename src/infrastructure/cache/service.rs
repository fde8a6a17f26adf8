//! Resolution cache trait and the error type shared by the key-value adapters.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by the cache and counter adapters.
///
/// These never reach end users: the lifecycle service logs them and falls
/// back to the link store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache and counter operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Best-effort, TTL-bounded mapping from short code to target URL.
///
/// A missing entry means "never written", "expired" or "evicted"; callers
/// cannot tell these apart and must not need to. An entry is only ever a
/// value supplier, never proof that a link exists.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::MemoryCache`] - in-process cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResolutionCache: Send + Sync {
    /// Returns the cached target URL for a short code, if any.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Caches a target URL for `ttl_seconds`.
    async fn set_url(
        &self,
        short_code: &str,
        target_url: &str,
        ttl_seconds: u64,
    ) -> CacheResult<()>;

    /// Removes the cached entry for a short code. Missing entries are fine.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
