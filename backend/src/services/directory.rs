//! Existence checks for the master-data collaborators
//!
//! Clients, suppliers, employees and vendeurs are owned by external CRUD
//! controllers; the ledgers only need a valid identifier. This service is
//! the consumed interface: lookup-by-id existence checks, nothing more.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Directory service for referential-integrity checks
#[derive(Clone)]
pub struct DirectoryService {
    db: PgPool,
}

impl DirectoryService {
    /// Create a new DirectoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fail with NotFound unless the client exists
    pub async fn ensure_client(&self, client_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(client_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Client".to_string()));
        }
        Ok(())
    }

    /// Fail with NotFound unless the supplier exists
    pub async fn ensure_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(supplier_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        Ok(())
    }

    /// Fail with NotFound unless the employee exists
    pub async fn ensure_employee(&self, employee_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
                .bind(employee_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Employee".to_string()));
        }
        Ok(())
    }

    /// Fail with NotFound unless the vendeur exists
    pub async fn ensure_vendeur(&self, vendeur_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM vendeurs WHERE id = $1)")
                .bind(vendeur_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Vendeur".to_string()));
        }
        Ok(())
    }
}
