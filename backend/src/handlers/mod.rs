//! HTTP handlers for the Gescom back-office

pub mod product;
pub mod purchase;
pub mod sales;

pub use product::*;
pub use purchase::*;
pub use sales::*;
