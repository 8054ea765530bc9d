//! HTTP API handlers

use super::handler::Outcome;
use super::state::AppState;
use super::types::*;
use crate::metrics::{record_gauge, RequestOutcome, Timer};
use crate::store::StoreError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

/// Error type for API responses
#[derive(Debug)]
pub enum ApiError {
    /// The namespace or key is absent
    NotFound(String),
    /// Request body or path could not be accepted
    BadRequest(String),
    /// Engine-level failure
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn outcome(&self) -> RequestOutcome {
        match self {
            ApiError::NotFound(_) => RequestOutcome::NotFound,
            _ => RequestOutcome::Failed,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NamespaceNotFound(_) | StoreError::KeyNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            StoreError::MalformedRequest(msg) => ApiError::BadRequest(msg),
            StoreError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details) = match self {
            ApiError::NotFound(details) => ("not found", details),
            ApiError::BadRequest(details) => ("malformed request", details),
            ApiError::Internal(details) => ("internal error", details),
        };
        let body = ErrorResponse { error: error.to_string(), details: Some(details) };
        (status, Json(body)).into_response()
    }
}

/// Turn an outcome into a response, counting it on the way out
fn respond<T: Serialize>(
    state: &AppState,
    timer: Timer,
    success: StatusCode,
    outcome: Result<Outcome<T>, ApiError>,
) -> Response {
    let result = match outcome {
        Ok(Outcome::Found(body)) => Ok(body),
        Ok(Outcome::Absent(reason)) => Err(ApiError::NotFound(reason)),
        Ok(Outcome::Failed(err)) => Err(err.into()),
        Err(err) => Err(err),
    };
    timer.stop();

    match result {
        Ok(body) => {
            state.metrics.record(RequestOutcome::Success);
            (success, Json(body)).into_response()
        }
        Err(err) => {
            state.metrics.record(err.outcome());
            err.into_response()
        }
    }
}

// ============================================================================
// Value Handlers
// ============================================================================

/// PUT /api/get - Read a value and the current checksum
pub async fn get_value(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SelectValueRequest>, JsonRejection>,
) -> Response {
    let timer = Timer::new("http.request.duration_ms");
    let outcome = payload
        .map_err(ApiError::from)
        .map(|Json(req)| state.handler.get_value(&req));
    respond(&state, timer, StatusCode::OK, outcome)
}

/// POST /api/insert - Insert or overwrite a value
pub async fn insert_value(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InsertValueRequest>, JsonRejection>,
) -> Response {
    let timer = Timer::new("http.request.duration_ms");
    let outcome = payload
        .map_err(ApiError::from)
        .map(|Json(req)| state.handler.insert_value(&req));
    respond(&state, timer, StatusCode::CREATED, outcome)
}

/// DELETE /api/delete - Remove a value
pub async fn delete_value(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SelectValueRequest>, JsonRejection>,
) -> Response {
    let timer = Timer::new("http.request.duration_ms");
    let outcome = payload
        .map_err(ApiError::from)
        .map(|Json(req)| state.handler.delete_value(&req));
    respond(&state, timer, StatusCode::OK, outcome)
}

// ============================================================================
// Store Handlers
// ============================================================================

/// GET /api/checksum - Checksum of the whole store
pub async fn get_checksum(State(state): State<Arc<AppState>>) -> Response {
    let timer = Timer::new("http.request.duration_ms");
    let outcome = state.handler.get_checksum();
    respond(&state, timer, StatusCode::OK, Ok(outcome))
}

/// POST /api/namespace - Create a namespace and its ancestors
pub async fn create_namespace(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SelectNamespaceRequest>, JsonRejection>,
) -> Response {
    let timer = Timer::new("http.request.duration_ms");
    let outcome = payload
        .map_err(ApiError::from)
        .map(|Json(req)| state.handler.create_namespace(&req));
    respond(&state, timer, StatusCode::CREATED, outcome)
}

/// GET /health - Liveness plus store counters
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let stats = state.database().stats()?;
    record_gauge("store.namespaces", stats.namespaces as f64);
    record_gauge("store.entries", stats.entries as f64);

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        namespaces: stats.namespaces,
        entries: stats.entries,
        requests: state.metrics.snapshot(),
    }))
}
