//! # dopedb
//!
//! An in-memory, namespaced key/value store served over a small JSON/HTTP
//! protocol. Every value lives under a slash-delimited namespace path, and
//! the whole store exposes one checksum that changes exactly when its
//! content changes.
//!
//! ```
//! use dopedb_core::Database;
//!
//! let db = Database::new();
//! db.create_namespace("users/admins")?;
//! let checksum = db.insert("users/admins", "alice", "1")?;
//! let (value, seen) = db.get("users/admins", "alice")?;
//! assert_eq!(value, "1");
//! assert_eq!(seen, checksum);
//! # Ok::<(), dopedb_core::StoreError>(())
//! ```

pub mod config;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod store;

pub use config::{Config, ConfigError};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogLevel};
pub use server::{build_router, AppState, DbServer, Outcome, RequestHandler, ServerError};
pub use shutdown::ShutdownCoordinator;
pub use store::{Checksum, Database, NamespacePath, StoreError, StoreLimits, StoreResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _ = LogLevel::Info;
        let _ = Database::new();
        let _ = Config::default();
    }
}
