//! Graceful shutdown coordinator

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};

/// Shutdown signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Graceful,
    Immediate,
}

/// Shutdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
    Shutdown,
}

/// Broadcasts a single shutdown request to every subscriber
pub struct ShutdownCoordinator {
    state: Arc<RwLock<ShutdownState>>,
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
    timeout: Duration,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator. `timeout` bounds how long in-flight
    /// requests may keep draining after a graceful signal.
    pub fn new(timeout: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            state: Arc::new(RwLock::new(ShutdownState::Running)),
            shutdown_tx,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownSignal> {
        self.shutdown_tx.subscribe()
    }

    /// Initiate graceful shutdown
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        if *state != ShutdownState::Running {
            warn!("Shutdown already in progress");
            return;
        }
        info!("Initiating graceful shutdown");
        *state = ShutdownState::ShuttingDown;
        drop(state);

        // No receivers just means nothing is serving yet
        if self.shutdown_tx.send(ShutdownSignal::Graceful).is_err() {
            warn!("Shutdown requested with no active listeners");
        }
    }

    /// Initiate immediate shutdown
    pub async fn shutdown_immediately(&self) {
        warn!("Initiating immediate shutdown");

        let mut state = self.state.write().await;
        *state = ShutdownState::Shutdown;
        drop(state);

        if let Err(e) = self.shutdown_tx.send(ShutdownSignal::Immediate) {
            error!("Failed to send immediate shutdown signal: {}", e);
        }
    }

    /// Record that all components have stopped
    pub async fn mark_complete(&self) {
        *self.state.write().await = ShutdownState::Shutdown;
        info!("Shutdown complete");
    }

    /// Check if shutdown is in progress
    pub async fn is_shutting_down(&self) -> bool {
        *self.state.read().await != ShutdownState::Running
    }

    /// Get current state
    pub async fn state(&self) -> ShutdownState {
        *self.state.read().await
    }

    /// Resolve once shutdown has been requested, including requests made
    /// before this call.
    pub async fn wait_for_shutdown(&self) -> ShutdownSignal {
        let mut rx = self.subscribe();
        match self.state().await {
            ShutdownState::Running => {}
            ShutdownState::ShuttingDown => return ShutdownSignal::Graceful,
            ShutdownState::Shutdown => return ShutdownSignal::Immediate,
        }
        rx.recv().await.unwrap_or(ShutdownSignal::Immediate)
    }
}

/// Install signal handlers for graceful shutdown
#[cfg(unix)]
pub fn install_signal_handlers(coordinator: Arc<ShutdownCoordinator>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
        coordinator.shutdown().await;
    });
    Ok(())
}

/// Install signal handlers for graceful shutdown (Windows)
#[cfg(windows)]
pub fn install_signal_handlers(coordinator: Arc<ShutdownCoordinator>) -> std::io::Result<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C"),
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
        coordinator.shutdown().await;
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_coordinator() {
        let coordinator = ShutdownCoordinator::new(Duration::from_millis(100));
        assert_eq!(coordinator.state().await, ShutdownState::Running);

        coordinator.shutdown().await;
        assert_eq!(coordinator.state().await, ShutdownState::ShuttingDown);
        assert!(coordinator.is_shutting_down().await);

        coordinator.mark_complete().await;
        assert_eq!(coordinator.state().await, ShutdownState::Shutdown);
    }

    #[tokio::test]
    async fn test_waiter_wakes_on_signal() {
        let coordinator = Arc::new(ShutdownCoordinator::new(Duration::from_millis(100)));
        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.wait_for_shutdown().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        coordinator.shutdown().await;

        assert_eq!(waiter.await.unwrap(), ShutdownSignal::Graceful);
    }

    #[tokio::test]
    async fn test_late_waiter_sees_earlier_shutdown() {
        let coordinator = ShutdownCoordinator::new(Duration::from_millis(100));
        coordinator.shutdown_immediately().await;
        assert_eq!(coordinator.wait_for_shutdown().await, ShutdownSignal::Immediate);
    }
}
