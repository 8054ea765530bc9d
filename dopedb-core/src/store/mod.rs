/*
    store - Namespaced key/value store with a whole-store checksum

    The namespace tree, the entries and the checksum are kept behind a
    single reader/writer lock. Each public operation takes the lock once, so
    the checksum handed back by a mutation is exactly that mutation's
    post-state.
*/

pub mod checksum;
pub mod errors;
pub mod namespace;
pub mod table;

pub use checksum::{Checksum, ChecksumEngine};
pub use errors::{PathError, StoreError, StoreResult};
pub use namespace::{NamespaceId, NamespacePath, NamespaceRegistry};
pub use table::KeyValueTable;

use crate::metrics::record_counter;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, error};

/// Helper to convert poison errors into StoreError
fn handle_poison<T>(_err: PoisonError<T>) -> StoreError {
    StoreError::Internal("Lock poisoned: a thread panicked while holding the lock".to_string())
}

/// Size limits enforced on incoming requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreLimits {
    /// Maximum key length in bytes
    pub max_key_len: usize,

    /// Maximum value length in bytes
    pub max_value_len: usize,

    /// Maximum number of segments in a namespace path
    pub max_namespace_depth: usize,

    /// Maximum length of one namespace path segment in bytes
    pub max_segment_len: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_key_len: 1024,
            max_value_len: 1024 * 1024, // 1 MiB
            max_namespace_depth: 32,
            max_segment_len: 255,
        }
    }
}

/// Point-in-time store counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Namespaces, root included
    pub namespaces: usize,
    pub entries: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    registry: NamespaceRegistry,
    table: KeyValueTable,
    checksum: ChecksumEngine,
    /// Set by the first successful insert, never cleared
    written: bool,
}

impl StoreState {
    fn resolve(&self, path: &NamespacePath) -> StoreResult<NamespaceId> {
        self.registry
            .resolve(path)
            .ok_or_else(|| StoreError::NamespaceNotFound(path.to_string()))
    }

    /// Once a checksum has been handed out by a write, reads must report it
    fn is_initialized(&self) -> bool {
        self.written || self.registry.has_user_namespaces()
    }

    fn recompute(&self) -> Checksum {
        ChecksumEngine::recompute(
            self.table
                .entries()
                .map(|(ns, key, value)| (self.registry.path_of(ns), key, value)),
        )
    }
}

/// The whole store: namespace tree, entries and checksum
#[derive(Debug, Default)]
pub struct Database {
    state: RwLock<StoreState>,
    limits: StoreLimits,
}

impl Database {
    /// Create an empty store with default limits
    pub fn new() -> Self {
        Self::with_limits(StoreLimits::default())
    }

    /// Create an empty store with the given limits
    pub fn with_limits(limits: StoreLimits) -> Self {
        Self { state: RwLock::new(StoreState::default()), limits }
    }

    pub fn limits(&self) -> &StoreLimits {
        &self.limits
    }

    fn parse_namespace(&self, namespace: &str) -> StoreResult<NamespacePath> {
        let path = NamespacePath::parse(namespace)?;
        path.check_limits(&self.limits)?;
        Ok(path)
    }

    fn check_key(&self, key: &str) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::MalformedRequest("key must not be empty".to_string()));
        }
        if key.len() > self.limits.max_key_len {
            return Err(StoreError::MalformedRequest(format!(
                "key length {} exceeds maximum {}",
                key.len(),
                self.limits.max_key_len
            )));
        }
        Ok(())
    }

    fn check_value(&self, value: &str) -> StoreResult<()> {
        if value.len() > self.limits.max_value_len {
            return Err(StoreError::MalformedRequest(format!(
                "value length {} exceeds maximum {}",
                value.len(),
                self.limits.max_value_len
            )));
        }
        Ok(())
    }

    /// Create a namespace and all missing ancestors. Idempotent; the checksum
    /// is untouched.
    pub fn create_namespace(&self, namespace: &str) -> StoreResult<()> {
        let path = self.parse_namespace(namespace)?;

        let mut state = self.state.write().map_err(handle_poison)?;
        let (_, created) = state.registry.ensure(&path);
        drop(state);

        if created > 0 {
            debug!(namespace = %path, created, "namespace created");
            record_counter("store.namespaces.created", created as u64);
        }
        record_counter("store.operations.namespace", 1);
        Ok(())
    }

    /// Whether a namespace exists
    pub fn namespace_exists(&self, namespace: &str) -> StoreResult<bool> {
        let path = self.parse_namespace(namespace)?;
        let state = self.state.read().map_err(handle_poison)?;
        Ok(state.registry.resolve(&path).is_some())
    }

    /// Sorted names of a namespace's direct children
    pub fn list_children(&self, namespace: &str) -> StoreResult<Vec<String>> {
        let path = self.parse_namespace(namespace)?;
        let state = self.state.read().map_err(handle_poison)?;
        let id = state.resolve(&path)?;
        Ok(state.registry.children(id).map(str::to_string).collect())
    }

    /// Read a value together with the checksum of the same snapshot
    pub fn get(&self, namespace: &str, key: &str) -> StoreResult<(String, Checksum)> {
        let path = self.parse_namespace(namespace)?;
        self.check_key(key)?;

        let state = self.state.read().map_err(handle_poison)?;
        let id = state.resolve(&path)?;
        let value = state.table.get(id, key).cloned().ok_or_else(|| StoreError::KeyNotFound {
            namespace: path.to_string(),
            key: key.to_string(),
        })?;
        let checksum = state.checksum.current();
        drop(state);

        record_counter("store.operations.read", 1);
        Ok((value, checksum))
    }

    /// Insert or overwrite an entry; the namespace must already exist
    pub fn insert(&self, namespace: &str, key: &str, value: &str) -> StoreResult<Checksum> {
        let path = self.parse_namespace(namespace)?;
        self.check_key(key)?;
        self.check_value(value)?;

        let mut state = self.state.write().map_err(handle_poison)?;
        let id = state.resolve(&path)?;
        let previous = state.table.insert(id, key.to_string(), value.to_string());
        state.written = true;

        let StoreState { registry, checksum, .. } = &mut *state;
        checksum.replace(registry.path_of(id), key, previous.as_deref(), value);
        let current = checksum.current();
        drop(state);

        debug!(namespace = %path, key, overwrite = previous.is_some(), "entry written");
        record_counter("store.operations.write", 1);
        Ok(current)
    }

    /// Remove an entry; the namespace is kept even if it becomes empty
    pub fn delete(&self, namespace: &str, key: &str) -> StoreResult<Checksum> {
        let path = self.parse_namespace(namespace)?;
        self.check_key(key)?;

        let mut state = self.state.write().map_err(handle_poison)?;
        let id = state.resolve(&path)?;
        let removed = state.table.remove(id, key).ok_or_else(|| StoreError::KeyNotFound {
            namespace: path.to_string(),
            key: key.to_string(),
        })?;

        let StoreState { registry, checksum, .. } = &mut *state;
        checksum.remove(registry.path_of(id), key, &removed);
        let current = checksum.current();
        drop(state);

        debug!(namespace = %path, key, "entry deleted");
        record_counter("store.operations.delete", 1);
        Ok(current)
    }

    /// Current checksum, or `None` while no namespace besides the root has
    /// ever been created and nothing has ever been written
    pub fn checksum(&self) -> StoreResult<Option<Checksum>> {
        let state = self.state.read().map_err(handle_poison)?;
        if !state.is_initialized() {
            return Ok(None);
        }
        Ok(Some(state.checksum.current()))
    }

    /// Checksum of the entry set regardless of initialization state
    pub fn content_checksum(&self) -> StoreResult<Checksum> {
        let state = self.state.read().map_err(handle_poison)?;
        Ok(state.checksum.current())
    }

    /// Recompute the checksum from scratch and compare it with the
    /// incrementally maintained value
    pub fn verify_checksum(&self) -> StoreResult<Checksum> {
        let state = self.state.read().map_err(handle_poison)?;
        let incremental = state.checksum.current();
        let recomputed = state.recompute();
        if incremental != recomputed {
            error!(%incremental, %recomputed, "checksum drift detected");
            return Err(StoreError::Internal(format!(
                "checksum mismatch: maintained {} but recomputed {}",
                incremental, recomputed
            )));
        }
        Ok(recomputed)
    }

    pub fn stats(&self) -> StoreResult<StoreStats> {
        let state = self.state.read().map_err(handle_poison)?;
        Ok(StoreStats {
            namespaces: state.registry.len(),
            entries: state.table.len(),
        })
    }
}
