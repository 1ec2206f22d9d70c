//! Route definitions for the Gescom back-office

use axum::{
    routing::get,
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Sales delivery notes
        .nest("/sales-notes", sales_note_routes())
        // Purchase delivery notes
        .nest("/purchase-notes", purchase_note_routes())
        // Product lookups (read-only here; master CRUD is external)
        .nest("/products", product_routes())
}

/// Sales delivery-note routes
fn sales_note_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_sales_notes).post(handlers::create_sales_note),
        )
        // Preview only: the numero is reserved by the create transaction
        .route("/next-numero", get(handlers::peek_next_sales_numero))
        .route(
            "/:note_id",
            get(handlers::get_sales_note)
                .put(handlers::update_sales_note)
                .delete(handlers::delete_sales_note),
        )
}

/// Purchase delivery-note routes
fn purchase_note_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_notes).post(handlers::create_purchase_note),
        )
        .route(
            "/:note_id",
            get(handlers::get_purchase_note)
                .put(handlers::update_purchase_note)
                .delete(handlers::delete_purchase_note),
        )
}

/// Product lookup routes
fn product_routes() -> Router<AppState> {
    Router::new().route("/:product_id", get(handlers::get_product))
}
