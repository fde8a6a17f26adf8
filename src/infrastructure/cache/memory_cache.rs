//! In-process resolution cache.

use super::service::{CacheResult, ResolutionCache};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    target_url: String,
    expires_at: Instant,
}

/// TTL-honouring cache held in a [`DashMap`].
///
/// Expired entries are dropped lazily on read. Suitable for single-node
/// deployments and tests; it is not shared between processes.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResolutionCache for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        match self.entries.get(short_code) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.target_url.clone())),
            Some(_) => {}
        }

        self.entries
            .remove_if(short_code, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn set_url(
        &self,
        short_code: &str,
        target_url: &str,
        ttl_seconds: u64,
    ) -> CacheResult<()> {
        let entry = Entry {
            target_url: target_url.to_string(),
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
        };
        self.entries.insert(short_code.to_string(), entry);
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.entries.remove(short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache.set_url("g", "https://example.com", 60).await.unwrap();

        let cached = cache.get_url("g").await.unwrap();
        assert_eq!(cached.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn test_zero_ttl_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache.set_url("g", "https://example.com", 0).await.unwrap();

        assert!(cache.get_url("g").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = MemoryCache::new();
        cache.set_url("g", "https://example.com", 60).await.unwrap();
        cache.invalidate("g").await.unwrap();
        cache.invalidate("never-written").await.unwrap();

        assert!(cache.get_url("g").await.unwrap().is_none());
    }
}
