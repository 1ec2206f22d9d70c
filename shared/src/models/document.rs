//! Delivery-note documents ("bons de livraison")
//!
//! Two families share the same shape: sales notes issued to clients and
//! purchase notes received from suppliers. Every line mutates the
//! referenced product's stock; the direction differs per family.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sales delivery note header (client side)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesNote {
    pub id: Uuid,
    /// Allocated sequential numero (`BL00001`); immutable, unique forever
    pub numero: String,
    pub note_date: NaiveDate,
    pub client_id: Uuid,
    pub vendeur_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line of a sales delivery note
///
/// Lines are never edited individually; an edit replaces the full set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesNoteLine {
    pub id: Uuid,
    pub note_id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Sales note with its ordered lines
#[derive(Debug, Clone, Serialize)]
pub struct SalesNoteWithLines {
    #[serde(flatten)]
    pub note: SalesNote,
    pub lines: Vec<SalesNoteLine>,
}

/// Purchase delivery note header (supplier side)
///
/// The numero mirrors the supplier's own paperwork: caller-supplied,
/// non-sequential from this system's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseNote {
    pub id: Uuid,
    pub numero: i64,
    pub note_date: NaiveDate,
    pub supplier_id: Uuid,
    pub employee_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line of a purchase delivery note, with its required free-text
/// description (independent of the product's own designation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseNoteLine {
    pub id: Uuid,
    pub note_id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Purchase note with its ordered lines
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseNoteWithLines {
    #[serde(flatten)]
    pub note: PurchaseNote,
    pub lines: Vec<PurchaseNoteLine>,
}
