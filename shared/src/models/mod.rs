//! Domain models for the Gescom back-office

pub mod document;
pub mod product;

pub use document::*;
pub use product::*;
