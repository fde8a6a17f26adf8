//! Redis-backed resolution cache.

use super::service::{CacheError, CacheResult, ResolutionCache};
use crate::infrastructure::redis_conn::RESOLVE_PREFIX;
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::debug;

/// Redis cache for short code → target URL lookups.
///
/// Entries are written with `SET EX`, so Redis enforces the TTL. Errors are
/// returned to the caller, which decides how to degrade.
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisCache {
    /// Wraps an established connection (see [`crate::infrastructure::redis_conn::connect`]).
    pub fn new(client: ConnectionManager) -> Self {
        Self {
            client,
            key_prefix: RESOLVE_PREFIX.to_string(),
        }
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }
}

#[async_trait]
impl ResolutionCache for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        let cached = conn
            .get::<_, Option<String>>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", key, e)))?;

        match &cached {
            Some(url) => debug!("Cache HIT: {} -> {}", short_code, url),
            None => debug!("Cache MISS: {}", short_code),
        }

        Ok(cached)
    }

    async fn set_url(
        &self,
        short_code: &str,
        target_url: &str,
        ttl_seconds: u64,
    ) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        conn.set_ex::<_, _, ()>(&key, target_url, ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {}: {}", key, e)))?;

        debug!(
            "Cache SET: {} -> {} (TTL: {}s)",
            short_code, target_url, ttl_seconds
        );
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i32>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("DEL {}: {}", key, e)))?;

        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", short_code);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
