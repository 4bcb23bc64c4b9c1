//! # reliquary-core
//!
//! Foundation crate for the Reliquary archive persistence layer.
//! Defines errors, configuration, data models, and constants shared by
//! the storage and health crates.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;

// Re-export the most commonly used types at the crate root.
pub use config::HealthConfig;
pub use errors::{ReliquaryError, ReliquaryResult};
