//! API routes definition

use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        // Value routes
        .route("/api/get", put(handlers::get_value))
        .route("/api/insert", post(handlers::insert_value))
        .route("/api/delete", delete(handlers::delete_value))
        // Store routes
        .route("/api/checksum", get(handlers::get_checksum))
        .route("/api/namespace", post(handlers::create_namespace))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        // State
        .with_state(state)
}
