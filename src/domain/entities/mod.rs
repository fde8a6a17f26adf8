//! Core domain entities.
//!
//! - [`Link`] - A shortened URL and its aggregate click statistics
//! - [`Click`] - One durable redirect event owned by a link
//!
//! Creation inputs use separate structs (`NewLink`, `NewClick`) so that
//! store-assigned fields never have to be invented by callers.

pub mod click;
pub mod link;

pub use click::{Click, ClickMeta, NewClick};
pub use link::{Link, NewLink};
