//! In-process click counter.

use super::service::ClickCounter;
use crate::infrastructure::cache::CacheResult;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Per-code counters in a [`DashMap`]; each increment holds the shard lock,
/// so it is atomic with respect to other increments of the same code.
#[derive(Debug, Default)]
pub struct MemoryCounter {
    counts: DashMap<String, i64>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a counter. Lets tests and tools seed a known delta.
    pub fn set(&self, short_code: &str, value: i64) {
        self.counts.insert(short_code.to_string(), value);
    }
}

#[async_trait]
impl ClickCounter for MemoryCounter {
    async fn increment(&self, short_code: &str) -> CacheResult<i64> {
        let mut entry = self.counts.entry(short_code.to_string()).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn get(&self, short_code: &str) -> CacheResult<i64> {
        Ok(self.counts.get(short_code).map(|v| *v).unwrap_or(0))
    }

    async fn subtract(&self, short_code: &str, delta: i64) -> CacheResult<i64> {
        match self.counts.entry(short_code.to_string()) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() -= delta;
                let left = *entry.get();
                if left <= 0 {
                    entry.remove();
                }
                Ok(left.max(0))
            }
            Entry::Vacant(_) => Ok(0),
        }
    }

    async fn reset(&self, short_code: &str) -> CacheResult<()> {
        self.counts.remove(short_code);
        Ok(())
    }

    async fn pending_codes(&self) -> CacheResult<Vec<String>> {
        let mut codes: Vec<String> = self
            .counts
            .iter()
            .filter(|e| *e.value() > 0)
            .map(|e| e.key().clone())
            .collect();
        codes.sort_unstable();
        Ok(codes)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_absent_counter_reads_zero() {
        let counter = MemoryCounter::new();
        assert_eq!(counter.get("nope").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increment_and_reset() {
        let counter = MemoryCounter::new();
        counter.increment("g").await.unwrap();
        assert_eq!(counter.increment("g").await.unwrap(), 2);

        counter.reset("g").await.unwrap();
        assert_eq!(counter.get("g").await.unwrap(), 0);
        assert!(counter.pending_codes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let counter = Arc::new(MemoryCounter::new());

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let counter = counter.clone();
                tokio::spawn(async move { counter.increment("hot").await.unwrap() })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.get("hot").await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_subtract_keeps_later_increments() {
        let counter = MemoryCounter::new();
        counter.set("g", 7);
        counter.increment("g").await.unwrap();

        assert_eq!(counter.subtract("g", 7).await.unwrap(), 1);
        assert_eq!(counter.get("g").await.unwrap(), 1);
        assert_eq!(counter.pending_codes().await.unwrap(), vec!["g"]);
    }

    #[tokio::test]
    async fn test_subtract_to_zero_removes_counter() {
        let counter = MemoryCounter::new();
        counter.set("g", 3);

        assert_eq!(counter.subtract("g", 3).await.unwrap(), 0);
        assert_eq!(counter.subtract("missing", 2).await.unwrap(), 0);
        assert!(counter.pending_codes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_codes() {
        let counter = MemoryCounter::new();
        counter.set("b", 3);
        counter.set("a", 1);
        counter.set("z", 0);

        assert_eq!(counter.pending_codes().await.unwrap(), vec!["a", "b"]);
    }
}
