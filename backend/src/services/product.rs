//! Product store: master-record lookup and atomic stock mutation
//!
//! Product master CRUD is owned by an external collaborator; this service
//! exposes only what the ledgers consume: lookup by id and the two stock
//! delta operations. All stock mutation in the system goes through these
//! single-statement updates; no caller may read-then-write stock across
//! two statements or concurrent operations would lose updates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Product;

/// Product service for lookups and stock deltas
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fetch a product master record
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, (
            Uuid,
            String,
            String,
            String,
            Decimal,
            Decimal,
            Decimal,
            DateTime<Utc>,
            DateTime<Utc>,
        )>(
            r#"
            SELECT id, reference, designation, unit, stock_quantity,
                   purchase_price, sale_price, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(Product {
            id: row.0,
            reference: row.1,
            designation: row.2,
            unit: row.3,
            stock_quantity: row.4,
            purchase_price: row.5,
            sale_price: row.6,
            created_at: row.7,
            updated_at: row.8,
        })
    }

    /// Check that a product exists, for line validation before any write
    pub async fn product_exists(&self, product_id: Uuid) -> AppResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    /// Atomically add `amount` to a product's stock
    ///
    /// Executed as a single UPDATE so concurrent deltas on the same product
    /// serialize in the database and never lose an update. Not idempotent:
    /// applying it twice doubles the effect. Runs on whatever executor the
    /// caller passes, typically the ledger's open transaction. A missing
    /// product is a hard error and aborts the enclosing transaction.
    pub async fn increase_stock<'e, E: PgExecutor<'e>>(
        executor: E,
        product_id: Uuid,
        amount: Decimal,
    ) -> AppResult<()> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: "Stock delta must be positive".to_string(),
                message_fr: "La variation de stock doit être positive".to_string(),
            });
        }

        let result = sqlx::query(
            "UPDATE products SET stock_quantity = stock_quantity + $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(amount)
        .bind(product_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    /// Atomically subtract `amount` from a product's stock
    ///
    /// Same guarantees as [`ProductService::increase_stock`]. Stock is
    /// allowed to go below zero: back-office operators record paperwork
    /// after the fact and a hard floor would block legitimate entries.
    /// Callers relying on non-negative stock must add their own guard.
    pub async fn decrease_stock<'e, E: PgExecutor<'e>>(
        executor: E,
        product_id: Uuid,
        amount: Decimal,
    ) -> AppResult<()> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: "Stock delta must be positive".to_string(),
                message_fr: "La variation de stock doit être positive".to_string(),
            });
        }

        let result = sqlx::query(
            "UPDATE products SET stock_quantity = stock_quantity - $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(amount)
        .bind(product_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }
}
