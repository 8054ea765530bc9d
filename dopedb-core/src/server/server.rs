//! HTTP server runner

use super::api::build_router;
use super::state::AppState;
use crate::config::Config;
use crate::shutdown::{ShutdownCoordinator, ShutdownSignal};
use crate::store::Database;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Errors raised while running the HTTP server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shutdown timed out after {0:?}")]
    ShutdownTimeout(std::time::Duration),
}

/// HTTP front end for one store
pub struct DbServer {
    state: Arc<AppState>,
    addr: SocketAddr,
    max_body_bytes: usize,
}

impl DbServer {
    /// Create a server over `db` using the `[server]` section of `config`
    pub fn new(db: Arc<Database>, config: &Config) -> Self {
        Self {
            state: Arc::new(AppState::new(db)),
            addr: config.server.bind_address,
            max_body_bytes: config.server.max_body_bytes,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Bind the listener. Split from [`DbServer::serve`] so callers can learn
    /// the bound address (port 0 binds an ephemeral port).
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        TcpListener::bind(self.addr)
            .await
            .map_err(|source| ServerError::Bind { addr: self.addr, source })
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight
    /// requests for at most the coordinator's timeout.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: Arc<ShutdownCoordinator>,
    ) -> Result<(), ServerError> {
        let router = build_router(self.state, self.max_body_bytes);
        let local = listener.local_addr()?;
        info!("dopedb listening on {}", local);

        let graceful = {
            let shutdown = shutdown.clone();
            async move {
                let signal = shutdown.wait_for_shutdown().await;
                info!(?signal, "stopping HTTP listener");
            }
        };
        let server = axum::serve(listener, router).with_graceful_shutdown(graceful);
        let mut server = tokio::spawn(async move { server.await });

        // Once shutdown is requested the server gets `timeout` to finish;
        // an immediate signal skips draining.
        tokio::select! {
            joined = &mut server => {
                joined.map_err(|e| std::io::Error::other(e.to_string()))??;
            }
            signal = shutdown.wait_for_shutdown() => {
                if signal == ShutdownSignal::Immediate {
                    server.abort();
                } else {
                    let timeout = shutdown.timeout();
                    match tokio::time::timeout(timeout, &mut server).await {
                        Ok(joined) => {
                            joined.map_err(|e| std::io::Error::other(e.to_string()))??;
                        }
                        Err(_) => {
                            warn!("in-flight requests did not drain in {:?}", timeout);
                            server.abort();
                            shutdown.mark_complete().await;
                            return Err(ServerError::ShutdownTimeout(timeout));
                        }
                    }
                }
            }
        }

        shutdown.mark_complete().await;
        Ok(())
    }

    /// Bind and serve in one step
    pub async fn run(self, shutdown: Arc<ShutdownCoordinator>) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}
