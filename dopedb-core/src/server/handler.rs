//! Protocol-level request handling
//!
//! Each call runs exactly one store operation and folds its result into an
//! [`Outcome`]. Absence is a regular outcome here, never an error.

use super::types::*;
use crate::store::{Database, StoreError, StoreResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of one protocol operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation succeeded with a payload
    Found(T),
    /// The namespace or key does not exist, or the store is uninitialized
    Absent(String),
    /// Malformed request or internal failure
    Failed(StoreError),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Found(value) => Outcome::Found(f(value)),
            Outcome::Absent(reason) => Outcome::Absent(reason),
            Outcome::Failed(err) => Outcome::Failed(err),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Outcome::Absent(_))
    }
}

impl<T> From<StoreResult<T>> for Outcome<T> {
    fn from(result: StoreResult<T>) -> Self {
        match result {
            Ok(value) => Outcome::Found(value),
            Err(err) if err.is_not_found() => Outcome::Absent(err.to_string()),
            Err(err) => Outcome::Failed(err),
        }
    }
}

/// Routes protocol operations to the store
#[derive(Debug, Clone)]
pub struct RequestHandler {
    db: Arc<Database>,
}

impl RequestHandler {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn get_value(&self, req: &SelectValueRequest) -> Outcome<ValueResponse> {
        let outcome: Outcome<_> = self.db.get(&req.namespace, &req.key).into();
        log_outcome("get", &req.namespace, &outcome);
        outcome.map(|(value, checksum)| ValueResponse { value, checksum: checksum.to_hex() })
    }

    pub fn insert_value(&self, req: &InsertValueRequest) -> Outcome<ChecksumResponse> {
        let outcome: Outcome<_> = self.db.insert(&req.namespace, &req.key, &req.value).into();
        log_outcome("insert", &req.namespace, &outcome);
        outcome.map(|checksum| ChecksumResponse { checksum: checksum.to_hex() })
    }

    pub fn delete_value(&self, req: &SelectValueRequest) -> Outcome<ChecksumResponse> {
        let outcome: Outcome<_> = self.db.delete(&req.namespace, &req.key).into();
        log_outcome("delete", &req.namespace, &outcome);
        outcome.map(|checksum| ChecksumResponse { checksum: checksum.to_hex() })
    }

    /// Absent until a non-root namespace is created or an entry is written
    pub fn get_checksum(&self) -> Outcome<ChecksumResponse> {
        match self.db.checksum() {
            Ok(Some(checksum)) => Outcome::Found(ChecksumResponse { checksum: checksum.to_hex() }),
            Ok(None) => Outcome::Absent("store is uninitialized".to_string()),
            Err(err) => Outcome::Failed(err),
        }
    }

    pub fn create_namespace(&self, req: &SelectNamespaceRequest) -> Outcome<NamespaceResponse> {
        // Never absent: creation of an existing namespace is a success.
        match self.db.create_namespace(&req.namespace) {
            Ok(()) => Outcome::Found(NamespaceResponse { namespace: req.namespace.clone() }),
            Err(err) => {
                warn!(namespace = %req.namespace, error = %err, "namespace rejected");
                Outcome::Failed(err)
            }
        }
    }
}

fn log_outcome<T>(op: &'static str, namespace: &str, outcome: &Outcome<T>) {
    match outcome {
        Outcome::Found(_) => debug!(op, namespace, "request served"),
        Outcome::Absent(reason) => debug!(op, namespace, %reason, "request target absent"),
        Outcome::Failed(err) => warn!(op, namespace, error = %err, "request failed"),
    }
}
