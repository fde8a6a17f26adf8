//! Application layer services implementing business logic.
//!
//! This layer orchestrates the link store, the resolution cache and the click
//! counter. Services consume the repository and adapter traits and provide a
//! clean API for HTTP handlers, background jobs and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link lifecycle: creation,
//!   resolution, click accounting, reconciliation and expiry sweeps

pub mod services;
