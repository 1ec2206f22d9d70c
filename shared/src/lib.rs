//! Shared types and domain logic for the Gescom back-office
//!
//! This crate contains the domain models, the delivery-note numbering
//! scheme and the pure validation helpers shared between the backend
//! and its test suites.

pub mod models;
pub mod numbering;
pub mod validation;

pub use models::*;
pub use numbering::*;
pub use validation::*;
