//! Domain layer containing business entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Durable store trait definitions
//! - [`lifecycle`] - Outcomes reported by the link lifecycle service
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. The orchestration itself lives in
//! [`crate::application::services::LinkService`].

pub mod entities;
pub mod lifecycle;
pub mod repositories;

pub use lifecycle::{LinkAnalytics, ReconcileReport, Resolution, SweepReport};
