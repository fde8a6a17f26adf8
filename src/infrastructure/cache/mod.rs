//! Resolution cache: short code → target URL, best effort.
//!
//! Provides a [`ResolutionCache`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MemoryCache`] - In-process cache for single-node runs and tests
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, ResolutionCache};

#[cfg(test)]
pub use service::MockResolutionCache;
