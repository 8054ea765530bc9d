//! Server state shared across requests

use super::handler::RequestHandler;
use crate::metrics::MetricsCollector;
use crate::store::Database;
use std::sync::Arc;

/// Server state shared across requests
#[derive(Debug, Clone)]
pub struct AppState {
    /// Protocol façade over the store
    pub handler: RequestHandler,

    /// Request outcome counters
    pub metrics: Arc<MetricsCollector>,
}

impl AppState {
    /// Create server state around an existing store
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            handler: RequestHandler::new(db),
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    pub fn database(&self) -> &Arc<Database> {
        self.handler.database()
    }
}
