//! Redis-backed click counter.

use super::service::ClickCounter;
use crate::infrastructure::cache::{CacheError, CacheResult};
use crate::infrastructure::redis_conn::COUNT_PREFIX;
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::debug;

/// Keys fetched per `SCAN` round trip.
const SCAN_BATCH: usize = 500;

/// `DECRBY`, then `DEL` when nothing is left, in one server-side step.
const SUBTRACT_SCRIPT: &str = r#"
local left = redis.call('DECRBY', KEYS[1], ARGV[1])
if left <= 0 then
    redis.call('DEL', KEYS[1])
end
return left
"#;

/// Lookup counters stored as plain Redis integers without a TTL.
///
/// `INCR` is atomic on the server, so concurrent resolutions never lose an
/// increment.
pub struct RedisClickCounter {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisClickCounter {
    /// Wraps an established connection (see [`crate::infrastructure::redis_conn::connect`]).
    pub fn new(client: ConnectionManager) -> Self {
        Self {
            client,
            key_prefix: COUNT_PREFIX.to_string(),
        }
    }

    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }
}

#[async_trait]
impl ClickCounter for RedisClickCounter {
    async fn increment(&self, short_code: &str) -> CacheResult<i64> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        conn.incr::<_, _, i64>(&key, 1)
            .await
            .map_err(|e| CacheError::OperationError(format!("INCR {}: {}", key, e)))
    }

    async fn get(&self, short_code: &str) -> CacheResult<i64> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        let value = conn
            .get::<_, Option<i64>>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", key, e)))?;

        Ok(value.unwrap_or(0))
    }

    async fn subtract(&self, short_code: &str, delta: i64) -> CacheResult<i64> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        let left: i64 = redis::cmd("EVAL")
            .arg(SUBTRACT_SCRIPT)
            .arg(1)
            .arg(&key)
            .arg(delta)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::OperationError(format!("DECRBY {}: {}", key, e)))?;

        debug!("Counter SUBTRACT: {} (-{}, {} left)", short_code, delta, left);
        Ok(left.max(0))
    }

    async fn reset(&self, short_code: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        conn.del::<_, i32>(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("DEL {}: {}", key, e)))?;

        debug!("Counter RESET: {}", short_code);
        Ok(())
    }

    async fn pending_codes(&self) -> CacheResult<Vec<String>> {
        let mut conn = self.client.clone();
        let pattern = format!("{}*", self.key_prefix);
        let mut cursor: u64 = 0;
        let mut codes = Vec::new();

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::OperationError(format!("SCAN {}: {}", pattern, e)))?;

            codes.extend(
                keys.into_iter()
                    .filter_map(|k| k.strip_prefix(&self.key_prefix).map(str::to_string)),
            );

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        codes.sort_unstable();
        codes.dedup();
        Ok(codes)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
