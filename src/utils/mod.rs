//! Utility functions shared across layers.
//!
//! - [`base62`] - Short code encoding from numeric ids

pub mod base62;
