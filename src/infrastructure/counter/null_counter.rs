//! No-op click counter for deployments without Redis.

use super::service::ClickCounter;
use crate::infrastructure::cache::CacheResult;
use async_trait::async_trait;

/// Discards every increment. Lookups are then simply not counted; the durable
/// per-redirect clicks are unaffected.
#[derive(Debug, Default)]
pub struct NullCounter;

impl NullCounter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClickCounter for NullCounter {
    async fn increment(&self, _short_code: &str) -> CacheResult<i64> {
        Ok(0)
    }

    async fn get(&self, _short_code: &str) -> CacheResult<i64> {
        Ok(0)
    }

    async fn subtract(&self, _short_code: &str, _delta: i64) -> CacheResult<i64> {
        Ok(0)
    }

    async fn reset(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn pending_codes(&self) -> CacheResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
