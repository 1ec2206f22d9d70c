//! Sales delivery-note ledger (client side)
//!
//! Orchestrates creation, full-document edit and deletion of sales notes.
//! Each operation is one all-or-nothing transaction spanning the numero
//! allocation, the header and line writes and every stock delta those
//! lines trigger; partial application is never observable. Sales lines
//! DECREASE product stock, purchase lines increase it.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{numbering, DirectoryService, ProductService};
use shared::models::{SalesNote, SalesNoteLine, SalesNoteWithLines};
use shared::validation;

/// Bounded retries when the numero insert loses a race to a concurrent
/// creator. Exhaustion surfaces NumberAllocationFailed; the caller may
/// resubmit.
const MAX_NUMERO_ATTEMPTS: u32 = 3;

/// Sales ledger service
#[derive(Clone)]
pub struct SalesNoteService {
    db: PgPool,
}

/// Line input shared by create and update
#[derive(Debug, Deserialize)]
pub struct SalesLineInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Input for creating a sales note
#[derive(Debug, Deserialize)]
pub struct CreateSalesNoteInput {
    pub note_date: NaiveDate,
    pub client_id: Uuid,
    pub vendeur_id: Uuid,
    pub lines: Vec<SalesLineInput>,
}

/// Input for a full-document edit: header fields may change, the numero
/// may not, and the line set is replaced wholesale
#[derive(Debug, Deserialize)]
pub struct UpdateSalesNoteInput {
    pub note_date: NaiveDate,
    pub client_id: Uuid,
    pub vendeur_id: Uuid,
    pub lines: Vec<SalesLineInput>,
}

/// Lock the note header for the remainder of the transaction, or fail
/// with NotFound when the row does not exist (or no longer exists)
async fn lock_note_header(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    note_id: Uuid,
) -> AppResult<()> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM sales_notes WHERE id = $1 FOR UPDATE")
        .bind(note_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sales note".to_string()))?;

    Ok(())
}

impl SalesNoteService {
    /// Create a new SalesNoteService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a sales note with an allocated numero
    ///
    /// The candidate numero is recomputed on the transaction connection on
    /// each attempt; the unique index on `sales_notes.numero` is the
    /// authoritative guard. A lost race rolls the whole transaction back
    /// and retries with a fresh candidate.
    pub async fn create_note(&self, input: CreateSalesNoteInput) -> AppResult<SalesNoteWithLines> {
        self.validate_lines(&input.lines).await?;

        let directory = DirectoryService::new(self.db.clone());
        directory.ensure_client(input.client_id).await?;
        directory.ensure_vendeur(input.vendeur_id).await?;

        for attempt in 1..=MAX_NUMERO_ATTEMPTS {
            let mut tx = self.db.begin().await?;

            let numero = numbering::next_candidate(&mut *tx).await?;

            let inserted = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO sales_notes (numero, note_date, client_id, vendeur_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(&numero)
            .bind(input.note_date)
            .bind(input.client_id)
            .bind(input.vendeur_id)
            .fetch_one(&mut *tx)
            .await;

            let note_id = match inserted {
                Ok(id) => id,
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    // Lost the numero race; dropping tx rolls everything back
                    tracing::warn!(numero = %numero, attempt, "sales numero collision, retrying");
                    continue;
                }
                Err(e) => return Err(AppError::referential(e, "Client or vendeur")),
            };

            for (position, line) in input.lines.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO sales_note_lines (note_id, product_id, position, quantity, unit_price)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(note_id)
                .bind(line.product_id)
                .bind(position as i32)
                .bind(line.quantity)
                .bind(line.unit_price)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::referential(e, "Product"))?;

                ProductService::decrease_stock(&mut *tx, line.product_id, line.quantity).await?;
            }

            tx.commit().await?;

            tracing::info!(%note_id, numero = %numero, "sales note created");
            return self.get_note(note_id).await;
        }

        Err(AppError::NumberAllocationFailed)
    }

    /// Replace a sales note's header fields and full line set
    ///
    /// One transaction: reverse the stock effect of every current line,
    /// delete them, update the header (numero untouched), insert the new
    /// lines and apply their stock effect. Full reversal plus reapplication
    /// keeps the stock invariant regardless of how lines changed.
    pub async fn update_note(
        &self,
        note_id: Uuid,
        input: UpdateSalesNoteInput,
    ) -> AppResult<SalesNoteWithLines> {
        self.validate_lines(&input.lines).await?;

        let directory = DirectoryService::new(self.db.clone());
        directory.ensure_client(input.client_id).await?;
        directory.ensure_vendeur(input.vendeur_id).await?;

        let mut tx = self.db.begin().await?;

        // Lock the header on the transaction connection; the lock is the
        // existence guard, so a note deleted concurrently surfaces here
        // as NotFound before any stock is touched
        lock_note_header(&mut tx, note_id).await?;

        let old_lines = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT product_id, quantity FROM sales_note_lines WHERE note_id = $1",
        )
        .bind(note_id)
        .fetch_all(&mut *tx)
        .await?;

        for (product_id, quantity) in &old_lines {
            ProductService::increase_stock(&mut *tx, *product_id, *quantity).await?;
        }

        sqlx::query("DELETE FROM sales_note_lines WHERE note_id = $1")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE sales_notes
            SET note_date = $1, client_id = $2, vendeur_id = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(input.note_date)
        .bind(input.client_id)
        .bind(input.vendeur_id)
        .bind(note_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::referential(e, "Client or vendeur"))?;

        for (position, line) in input.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sales_note_lines (note_id, product_id, position, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(note_id)
            .bind(line.product_id)
            .bind(position as i32)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::referential(e, "Product"))?;

            ProductService::decrease_stock(&mut *tx, line.product_id, line.quantity).await?;
        }

        tx.commit().await?;

        self.get_note(note_id).await
    }

    /// Delete a sales note, reversing its stock contribution
    ///
    /// The header lock inside the transaction is the existence guard:
    /// of two racing deleters, the loser blocks on the lock, finds the
    /// row gone once the winner commits, and reverses nothing. A
    /// document's stock effect is reversed exactly once.
    pub async fn delete_note(&self, note_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        lock_note_header(&mut tx, note_id).await?;

        let lines = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT product_id, quantity FROM sales_note_lines WHERE note_id = $1",
        )
        .bind(note_id)
        .fetch_all(&mut *tx)
        .await?;

        for (product_id, quantity) in &lines {
            ProductService::increase_stock(&mut *tx, *product_id, *quantity).await?;
        }

        sqlx::query("DELETE FROM sales_note_lines WHERE note_id = $1")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sales_notes WHERE id = $1")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%note_id, "sales note deleted");
        Ok(())
    }

    /// Get a sales note with its ordered lines
    pub async fn get_note(&self, note_id: Uuid) -> AppResult<SalesNoteWithLines> {
        let row = sqlx::query_as::<_, (
            Uuid,
            String,
            NaiveDate,
            Uuid,
            Uuid,
            DateTime<Utc>,
            DateTime<Utc>,
        )>(
            r#"
            SELECT id, numero, note_date, client_id, vendeur_id, created_at, updated_at
            FROM sales_notes
            WHERE id = $1
            "#,
        )
        .bind(note_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sales note".to_string()))?;

        let note = SalesNote {
            id: row.0,
            numero: row.1,
            note_date: row.2,
            client_id: row.3,
            vendeur_id: row.4,
            created_at: row.5,
            updated_at: row.6,
        };

        let lines = sqlx::query_as::<_, (Uuid, Uuid, Uuid, i32, Decimal, Decimal)>(
            r#"
            SELECT id, note_id, product_id, position, quantity, unit_price
            FROM sales_note_lines
            WHERE note_id = $1
            ORDER BY position
            "#,
        )
        .bind(note_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|r| SalesNoteLine {
            id: r.0,
            note_id: r.1,
            product_id: r.2,
            position: r.3,
            quantity: r.4,
            unit_price: r.5,
        })
        .collect();

        Ok(SalesNoteWithLines { note, lines })
    }

    /// List all sales notes, most recent first
    pub async fn list_notes(&self) -> AppResult<Vec<SalesNote>> {
        let rows = sqlx::query_as::<_, (
            Uuid,
            String,
            NaiveDate,
            Uuid,
            Uuid,
            DateTime<Utc>,
            DateTime<Utc>,
        )>(
            r#"
            SELECT id, numero, note_date, client_id, vendeur_id, created_at, updated_at
            FROM sales_notes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| SalesNote {
                id: r.0,
                numero: r.1,
                note_date: r.2,
                client_id: r.3,
                vendeur_id: r.4,
                created_at: r.5,
                updated_at: r.6,
            })
            .collect())
    }

    /// Validate the line set before any persistence occurs
    async fn validate_lines(&self, lines: &[SalesLineInput]) -> AppResult<()> {
        validation::validate_line_count(lines.len()).map_err(|msg| AppError::Validation {
            field: "lines".to_string(),
            message: msg.to_string(),
            message_fr: "Un bon de livraison doit comporter au moins une ligne".to_string(),
        })?;

        let products = ProductService::new(self.db.clone());

        for line in lines {
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
