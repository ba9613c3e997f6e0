//! sc-core: shared types, IDs, errors, configuration, and event system.
//!
//! This crate is the foundational dependency for all other sc-* crates,
//! providing the job identifier, a unified error type, the slide and
//! artifact model, application configuration, and a broadcast event bus.

pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod slide;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use slide::*;
