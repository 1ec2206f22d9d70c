//! Database models for the Gescom back-office
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
