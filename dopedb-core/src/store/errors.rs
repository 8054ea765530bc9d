/*
    errors.rs - Error types for the store subsystem

    Absence (missing namespace or key) is modelled as its own variants so the
    protocol layer can recover it into a not-found outcome instead of a failure.
*/

use thiserror::Error;

/// Errors that can occur in the store subsystem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The namespace (or one of its ancestors) was never created
    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    /// The namespace exists but holds no entry under this key
    #[error("Key not found: {key} in namespace {namespace}")]
    KeyNotFound { namespace: String, key: String },

    /// Invalid path syntax or payload
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Engine-level failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// True for the variants callers treat as a normal "absent" result.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NamespaceNotFound(_) | StoreError::KeyNotFound { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Namespace path syntax errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A segment between delimiters is empty
    #[error("empty segment in namespace path '{0}'")]
    EmptySegment(String),

    /// More segments than the configured maximum
    #[error("namespace path '{path}' exceeds maximum depth {max}")]
    TooDeep { path: String, max: usize },

    /// A single segment is longer than the configured maximum
    #[error("segment '{segment}' exceeds maximum length {max}")]
    SegmentTooLong { segment: String, max: usize },
}

impl From<PathError> for StoreError {
    fn from(err: PathError) -> Self {
        StoreError::MalformedRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NamespaceNotFound("users".to_string());
        assert_eq!(err.to_string(), "Namespace not found: users");

        let err = StoreError::KeyNotFound {
            namespace: "users".to_string(),
            key: "alice".to_string(),
        };
        assert_eq!(err.to_string(), "Key not found: alice in namespace users");
    }

    #[test]
    fn test_not_found_grouping() {
        assert!(StoreError::NamespaceNotFound("a".into()).is_not_found());
        assert!(StoreError::KeyNotFound { namespace: "a".into(), key: "k".into() }.is_not_found());
        assert!(!StoreError::MalformedRequest("bad".into()).is_not_found());
        assert!(!StoreError::Internal("boom".into()).is_not_found());
    }

    #[test]
    fn test_path_error_conversion() {
        let err: StoreError = PathError::EmptySegment("a//b".to_string()).into();
        assert!(matches!(err, StoreError::MalformedRequest(_)));
        assert!(err.to_string().contains("a//b"));
    }
}
