//! HTTP handlers for sales delivery-note endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::sales::{CreateSalesNoteInput, SalesNoteService, UpdateSalesNoteInput};
use crate::services::NumberingService;
use crate::AppState;
use crate::models::{SalesNote, SalesNoteWithLines};

/// Create a sales note; the numero is allocated server-side
pub async fn create_sales_note(
    State(state): State<AppState>,
    Json(input): Json<CreateSalesNoteInput>,
) -> AppResult<Json<SalesNoteWithLines>> {
    let service = SalesNoteService::new(state.db);
    let note = service.create_note(input).await?;
    Ok(Json(note))
}

/// List all sales notes
pub async fn list_sales_notes(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SalesNote>>> {
    let service = SalesNoteService::new(state.db);
    let notes = service.list_notes().await?;
    Ok(Json(notes))
}

/// Get a sales note with its lines
pub async fn get_sales_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> AppResult<Json<SalesNoteWithLines>> {
    let service = SalesNoteService::new(state.db);
    let note = service.get_note(note_id).await?;
    Ok(Json(note))
}

/// Replace a sales note's header fields and line set
pub async fn update_sales_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
    Json(input): Json<UpdateSalesNoteInput>,
) -> AppResult<Json<SalesNoteWithLines>> {
    let service = SalesNoteService::new(state.db);
    let note = service.update_note(note_id, input).await?;
    Ok(Json(note))
}

/// Delete a sales note and reverse its stock effect
pub async fn delete_sales_note(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = SalesNoteService::new(state.db);
    service.delete_note(note_id).await?;
    Ok(Json(()))
}

/// Preview the next sales numero (display only, not a reservation)
pub async fn peek_next_sales_numero(
    State(state): State<AppState>,
) -> AppResult<Json<NextNumeroResponse>> {
    let service = NumberingService::new(state.db);
    let numero = service.peek_next().await?;
    Ok(Json(NextNumeroResponse { numero }))
}

/// Response for the numero preview
#[derive(Debug, Serialize)]
pub struct NextNumeroResponse {
    pub numero: String,
}
