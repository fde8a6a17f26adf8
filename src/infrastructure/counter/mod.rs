//! Click counter: cheap per-code lookup counts awaiting reconciliation.
//!
//! - [`RedisClickCounter`] - Production Redis-backed counter
//! - [`MemoryCounter`] - In-process counter for single-node runs and tests
//! - [`NullCounter`] - No-op implementation when Redis is disabled

mod memory_counter;
mod null_counter;
mod redis_counter;
mod service;

pub use memory_counter::MemoryCounter;
pub use null_counter::NullCounter;
pub use redis_counter::RedisClickCounter;
pub use service::ClickCounter;

#[cfg(test)]
pub use service::MockClickCounter;
