//! Purchase delivery-note ledger (supplier side)
//!
//! Mirror of the sales ledger with three differences: the numero is
//! caller-supplied (it mirrors the supplier's own paperwork) and validated
//! as a positive integer against a unique index; every line carries a
//! required free-text description; and the stock direction is inverted —
//! purchase lines INCREASE product stock, their reversal decreases it.
//! The numero is immutable on edit, same discipline as the sales side.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{DirectoryService, ProductService};
use shared::models::{PurchaseNote, PurchaseNoteLine, PurchaseNoteWithLines};
use shared::validation;

/// Purchase ledger service
#[derive(Clone)]
pub struct PurchaseNoteService {
    db: PgPool,
}

/// Line input shared by create and update
#[derive(Debug, Deserialize)]
pub struct PurchaseLineInput {
    pub product_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Input for creating a purchase note; the numero comes from the
/// supplier's paperwork
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseNoteInput {
    pub numero: i64,
    pub note_date: NaiveDate,
    pub supplier_id: Uuid,
    pub employee_id: Uuid,
    pub lines: Vec<PurchaseLineInput>,
}

/// Input for a full-document edit; the numero may not change
#[derive(Debug, Deserialize)]
pub struct UpdatePurchaseNoteInput {
    pub note_date: NaiveDate,
    pub supplier_id: Uuid,
    pub employee_id: Uuid,
    pub lines: Vec<PurchaseLineInput>,
}

/// Lock the note header for the remainder of the transaction, or fail
/// with NotFound when the row does not exist (or no longer exists)
async fn lock_note_header(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    note_id: Uuid,
) -> AppResult<()> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM purchase_notes WHERE id = $1 FOR UPDATE")
        .bind(note_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase note".to_string()))?;

    Ok(())
}

impl PurchaseNoteService {
    /// Create a new PurchaseNoteService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a purchase note with its caller-supplied numero
    ///
    /// One transaction: header insert (unique index on numero; a conflict
    /// is the caller's duplicate, not a race to retry), line inserts, and
    /// a stock increase per line.
    pub async fn create_note(
        &self,
        input: CreatePurchaseNoteInput,
    ) -> AppResult<PurchaseNoteWithLines> {
        validation::validate_purchase_numero(input.numero).map_err(|msg| {
            AppError::Validation {
                field: "numero".to_string(),
                message: msg.to_string(),
                message_fr: "Le numéro doit être un entier positif".to_string(),
            }
        })?;

        self.validate_lines(&input.lines).await?;

        let directory = DirectoryService::new(self.db.clone());
        directory.ensure_supplier(input.supplier_id).await?;
        directory.ensure_employee(input.employee_id).await?;

        let mut tx = self.db.begin().await?;

        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO purchase_notes (numero, note_date, supplier_id, employee_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.numero)
        .bind(input.note_date)
        .bind(input.supplier_id)
        .bind(input.employee_id)
        .fetch_one(&mut *tx)
        .await;

        let note_id = match inserted {
            Ok(id) => id,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::DuplicateEntry("numero".to_string()));
            }
            Err(e) => return Err(AppError::referential(e, "Supplier or employee")),
        };

        for (position, line) in input.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO purchase_note_lines (note_id, product_id, position, description, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(note_id)
            .bind(line.product_id)
            .bind(position as i32)
            .bind(line.description.trim())
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::referential(e, "Product"))?;

            ProductService::increase_stock(&mut *tx, line.product_id, line.quantity).await?;
        }

        tx.commit().await?;

        tracing::info!(%note_id, numero = input.numero, "purchase note created");
        self.get_note(note_id).await
    }

    /// Replace a purchase note's header fields and full line set
    ///
    /// Same reverse-and-reapply scheme as the sales side, with the stock
    /// direction inverted: old lines are decreased back out, new lines
    /// increased in.
    pub async fn update_note(
        &self,
        note_id: Uuid,
        input: UpdatePurchaseNoteInput,
    ) -> AppResult<PurchaseNoteWithLines> {
        self.validate_lines(&input.lines).await?;

        let directory = DirectoryService::new(self.db.clone());
        directory.ensure_supplier(input.supplier_id).await?;
        directory.ensure_employee(input.employee_id).await?;

        let mut tx = self.db.begin().await?;

        // Lock the header on the transaction connection; the lock is the
        // existence guard, so a note deleted concurrently surfaces here
        // as NotFound before any stock is touched
        lock_note_header(&mut tx, note_id).await?;

        let old_lines = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT product_id, quantity FROM purchase_note_lines WHERE note_id = $1",
        )
        .bind(note_id)
        .fetch_all(&mut *tx)
        .await?;

        for (product_id, quantity) in &old_lines {
            ProductService::decrease_stock(&mut *tx, *product_id, *quantity).await?;
        }

        sqlx::query("DELETE FROM purchase_note_lines WHERE note_id = $1")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE purchase_notes
            SET note_date = $1, supplier_id = $2, employee_id = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(input.note_date)
        .bind(input.supplier_id)
        .bind(input.employee_id)
        .bind(note_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::referential(e, "Supplier or employee"))?;

        for (position, line) in input.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO purchase_note_lines (note_id, product_id, position, description, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(note_id)
            .bind(line.product_id)
            .bind(position as i32)
            .bind(line.description.trim())
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::referential(e, "Product"))?;

            ProductService::increase_stock(&mut *tx, line.product_id, line.quantity).await?;
        }

        tx.commit().await?;

        self.get_note(note_id).await
    }

    /// Delete a purchase note, reversing its stock contribution
    ///
    /// The header lock inside the transaction is the existence guard:
    /// of two racing deleters, the loser blocks on the lock, finds the
    /// row gone once the winner commits, and reverses nothing. A
    /// document's stock effect is reversed exactly once.
    pub async fn delete_note(&self, note_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        lock_note_header(&mut tx, note_id).await?;

        let lines = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT product_id, quantity FROM purchase_note_lines WHERE note_id = $1",
        )
        .bind(note_id)
        .fetch_all(&mut *tx)
        .await?;

        for (product_id, quantity) in &lines {
            ProductService::decrease_stock(&mut *tx, *product_id, *quantity).await?;
        }

        sqlx::query("DELETE FROM purchase_note_lines WHERE note_id = $1")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM purchase_notes WHERE id = $1")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%note_id, "purchase note deleted");
        Ok(())
    }

    /// Get a purchase note with its ordered lines
    pub async fn get_note(&self, note_id: Uuid) -> AppResult<PurchaseNoteWithLines> {
        let row = sqlx::query_as::<_, (
            Uuid,
            i64,
            NaiveDate,
            Uuid,
            Uuid,
            DateTime<Utc>,
            DateTime<Utc>,
        )>(
            r#"
            SELECT id, numero, note_date, supplier_id, employee_id, created_at, updated_at
            FROM purchase_notes
            WHERE id = $1
            "#,
        )
        .bind(note_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase note".to_string()))?;

        let note = PurchaseNote {
            id: row.0,
            numero: row.1,
            note_date: row.2,
            supplier_id: row.3,
            employee_id: row.4,
            created_at: row.5,
            updated_at: row.6,
        };

        let lines = sqlx::query_as::<_, (Uuid, Uuid, Uuid, i32, String, Decimal, Decimal)>(
            r#"
            SELECT id, note_id, product_id, position, description, quantity, unit_price
            FROM purchase_note_lines
            WHERE note_id = $1
            ORDER BY position
            "#,
        )
        .bind(note_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|r| PurchaseNoteLine {
            id: r.0,
            note_id: r.1,
            product_id: r.2,
            position: r.3,
            description: r.4,
            quantity: r.5,
            unit_price: r.6,
        })
        .collect();

        Ok(PurchaseNoteWithLines { note, lines })
    }

    /// List all purchase notes, most recent first
    pub async fn list_notes(&self) -> AppResult<Vec<PurchaseNote>> {
        let rows = sqlx::query_as::<_, (
            Uuid,
            i64,
            NaiveDate,
            Uuid,
            Uuid,
            DateTime<Utc>,
            DateTime<Utc>,
        )>(
            r#"
            SELECT id, numero, note_date, supplier_id, employee_id, created_at, updated_at
            FROM purchase_notes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PurchaseNote {
                id: r.0,
                numero: r.1,
                note_date: r.2,
                supplier_id: r.3,
                employee_id: r.4,
                created_at: r.5,
                updated_at: r.6,
            })
            .collect())
    }

    /// Validate the line set before any persistence occurs
    async fn validate_lines(&self, lines: &[PurchaseLineInput]) -> AppResult<()> {
        validation::validate_line_count(lines.len()).map_err(|msg| AppError::Validation {
            field: "lines".to_string(),
            message: msg.to_string(),
            message_fr: "Un bon de livraison doit comporter au moins une ligne".to_string(),
        })?;

        let products = ProductService::new(self.db.clone());

        for line in lines {
            validation::validate_line_description(&line.description).map_err(|msg| {
                AppError::Validation {
                    field: "description".to_string(),
                    message: msg.to_string(),
                    message_fr: "La désignation de la ligne ne peut pas être vide".to_string(),
                }
            })?;

            validation::validate_quantity(line.quantity).map_err(|msg| AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
                message_fr: "La quantité doit être supérieure à 0".to_string(),
            })?;

            validation::validate_unit_price(line.unit_price).map_err(|msg| {
                AppError::Validation {
                    field: "unit_price".to_string(),
                    message: msg.to_string(),
                    message_fr: "Le prix unitaire ne peut pas être négatif".to_string(),
                }
            })?;

            if !products.product_exists(line.product_id).await? {
                return Err(AppError::NotFound(format!("Product {}", line.product_id)));
            }
        }

        Ok(())
    }
}
