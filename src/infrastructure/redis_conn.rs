//! Shared Redis connection for the resolution cache and the click counter.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::info;

use crate::infrastructure::cache::{CacheError, CacheResult};

/// Key prefix for cached short code → target URL entries.
pub const RESOLVE_PREFIX: &str = "resolve:";
/// Key prefix for per-code lookup counters.
pub const COUNT_PREFIX: &str = "count:";

/// Connects to Redis and validates the connection with a PING.
///
/// The returned manager is cheap to clone and reconnects on its own; both
/// adapters share it and stay apart through their key prefixes.
///
/// # Errors
///
/// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
/// be established, or the PING health check fails.
pub async fn connect(redis_url: &str) -> CacheResult<ConnectionManager> {
    info!("Connecting to Redis at {}", redis_url);

    let client = Client::open(redis_url).map_err(|e| {
        CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
    })?;

    let manager = ConnectionManager::new(client)
        .await
        .map_err(|e| CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e)))?;

    let mut test_conn = manager.clone();
    test_conn
        .ping::<()>()
        .await
        .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

    info!("Connected to Redis");

    Ok(manager)
}
