//! HTTP protocol surface for dopedb
//!
//! Five JSON endpoints under `/api` plus `/health`. A missing namespace or
//! key answers 404, malformed input 400 and engine faults 500.

pub mod api;
pub mod handler;
pub mod handlers;
pub mod server;
pub mod state;
pub mod types;

pub use api::build_router;
pub use handler::{Outcome, RequestHandler};
pub use server::{DbServer, ServerError};
pub use state::AppState;
