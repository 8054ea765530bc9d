//! Request/Response types for the HTTP API

use crate::metrics::MetricsSnapshot;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request Types
// ============================================================================

/// Selects one value: body of `/api/get` and `/api/delete`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectValueRequest {
    pub key: String,
    pub namespace: String,
}

/// Body of `/api/insert`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertValueRequest {
    pub key: String,
    pub value: String,
    pub namespace: String,
}

/// Body of `/api/namespace`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectNamespaceRequest {
    pub namespace: String,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueResponse {
    pub value: String,
    /// Checksum of the whole store at the time of the read
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumResponse {
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceResponse {
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub namespaces: usize,
    pub entries: usize,
    pub requests: MetricsSnapshot,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
