//! HTTP handlers for product lookups
//!
//! Product master CRUD belongs to an external collaborator; this surface
//! only exposes the read the delivery-note forms need (reference,
//! designation, current stock).

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::ProductService;
use crate::AppState;
use crate::models::Product;

/// Get a product with its current stock quantity
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}
