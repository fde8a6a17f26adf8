//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`cache`] - Resolution cache adapters
//! - [`counter`] - Click counter adapters
//! - [`persistence`] - Link store implementations (PostgreSQL and in-memory)
//! - [`redis_conn`] - Shared Redis connection and key namespaces

pub mod cache;
pub mod counter;
pub mod persistence;
pub mod redis_conn;
