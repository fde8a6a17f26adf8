//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, ResolutionCache};
use async_trait::async_trait;
use tracing::debug;

/// A cache that stores nothing; every lookup is a miss.
///
/// Used when Redis is not configured or unreachable at startup. Resolution
/// then always goes to the link store, which is still correct.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResolutionCache for NullCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_url(
        &self,
        _short_code: &str,
        _target_url: &str,
        _ttl_seconds: u64,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
