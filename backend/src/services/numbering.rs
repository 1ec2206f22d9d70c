//! Sequential numero allocation for sales delivery notes
//!
//! The candidate is computed by scanning the highest numeric suffix over
//! all existing sales numeros. The scan reserves nothing: scan-then-insert
//! is race-prone under concurrent creators, so the actual reservation is
//! the header insert guarded by the unique index on `sales_notes.numero`,
//! and the sales ledger retries the whole transaction on conflict.

use sqlx::{PgExecutor, PgPool};

use crate::error::AppResult;
use shared::numbering::{format_sales_numero, SALES_NUMERO_PREFIX};

/// Highest counter currently persisted across all sales notes, 0 when none
pub(crate) async fn current_max<'e, E: PgExecutor<'e>>(executor: E) -> AppResult<i64> {
    // Suffix offset and filter derive from the shared prefix so the SQL
    // scan and the pure parser cannot drift apart
    let suffix_from = (SALES_NUMERO_PREFIX.len() + 1) as i32;
    let numero_pattern = format!("^{}[0-9]+$", SALES_NUMERO_PREFIX);

    let max: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(MAX(CAST(SUBSTRING(numero FROM $1) AS BIGINT)), 0)
        FROM sales_notes
        WHERE numero ~ $2
        "#,
    )
    .bind(suffix_from)
    .bind(&numero_pattern)
    .fetch_one(executor)
    .await?;

    Ok(max)
}

/// Next formatted numero candidate (max + 1)
pub(crate) async fn next_candidate<'e, E: PgExecutor<'e>>(executor: E) -> AppResult<String> {
    let max = current_max(executor).await?;
    Ok(format_sales_numero(max + 1))
}

/// Numbering service for the display-only numero preview
#[derive(Clone)]
pub struct NumberingService {
    db: PgPool,
}

impl NumberingService {
    /// Create a new NumberingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Preview the numero the next sales note would be assigned
    ///
    /// Used by the UI to pre-fill the form field. Callers must not treat
    /// this as a reservation; a concurrent creator may take the number
    /// first, in which case the create transaction allocates the next one.
    pub async fn peek_next(&self) -> AppResult<String> {
        next_candidate(&self.db).await
    }
}
