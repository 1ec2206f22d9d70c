//! Product master record

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product tracked by the stock ledger
///
/// `stock_quantity` is mutated only through the ledgers' atomic stock
/// deltas: at any quiescent point it equals the out-of-band baseline plus
/// the net signed sum of all currently-existing delivery-note lines that
/// reference the product (purchase lines positive, sales lines negative).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Human-entered unique reference code
    pub reference: String,
    pub designation: String,
    /// Unit of measure, e.g. "kg" or "pièce"
    pub unit: String,
    pub stock_quantity: Decimal,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
