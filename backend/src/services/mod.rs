//! Business logic services for the Gescom back-office

pub mod directory;
pub mod numbering;
pub mod product;
pub mod purchase;
pub mod sales;

pub use directory::DirectoryService;
pub use numbering::NumberingService;
pub use product::ProductService;
pub use purchase::PurchaseNoteService;
pub use sales::SalesNoteService;
