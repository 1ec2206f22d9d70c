//! HTTP handlers for purchase delivery-note endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::purchase::{
    CreatePurchaseNoteInput, PurchaseNoteService, UpdatePurchaseNoteInput,
};
use crate::AppState;
use crate::models::{PurchaseNote, PurchaseNoteWithLines};

/// Create a purchase note with its caller-supplied numero
pub async fn create_purchase_note(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseNoteInput>,
) -> AppResult<Json<PurchaseNoteWithLines>> {
    let service = PurchaseNoteService::new(state.db);
    let note = service.create_note(input).await?;
    Ok(Json(note))
}

/// List all purchase notes
pub async fn list_purchase_notes(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PurchaseNote>>> {
    let service = PurchaseNoteService::new(state.db);
    let notes = service.list_notes().await?;
    Ok(Json(notes))
}

/// Get a purchase note with its lines
pub async fn get_purchase_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> AppResult<Json<PurchaseNoteWithLines>> {
    let service = PurchaseNoteService::new(state.db);
    let note = service.get_note(note_id).await?;
    Ok(Json(note))
}

/// Replace a purchase note's header fields and line set
pub async fn update_purchase_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseNoteInput>,
) -> AppResult<Json<PurchaseNoteWithLines>> {
    let service = PurchaseNoteService::new(state.db);
    let note = service.update_note(note_id, input).await?;
    Ok(Json(note))
}

/// Delete a purchase note and reverse its stock effect
pub async fn delete_purchase_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = PurchaseNoteService::new(state.db);
    service.delete_note(note_id).await?;
    Ok(Json(()))
}
