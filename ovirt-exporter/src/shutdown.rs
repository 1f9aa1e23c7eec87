//! Graceful shutdown handling
//!
//! The server stops accepting scrapes once SIGTERM, SIGINT or SIGQUIT
//! (Ctrl+C elsewhere) arrives, and finishes the ones in flight.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// Broadcasts the shutdown request to whoever subscribed
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_tx: Arc<watch::Sender<bool>>,
    is_shutting_down: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            shutdown_tx: Arc::new(shutdown_tx),
            is_shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.is_shutting_down.load(Ordering::SeqCst)
    }

    /// Initiate shutdown; later calls are no-ops
    pub fn shutdown(&self) {
        if self.is_shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);
    }

    /// Wait for a termination signal from the OS, then shut down
    pub async fn wait_for_signal(&self) -> io::Result<()> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigquit = signal(SignalKind::quit())?;

            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM"),
                _ = sigint.recv() => info!("Received SIGINT"),
                _ = sigquit.recv() => info!("Received SIGQUIT"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await?;
            info!("Received Ctrl+C");
        }

        self.shutdown();
        Ok(())
    }

    /// Future resolving once shutdown has been requested, for axum
    pub fn signal(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.shutdown_tx.subscribe();

        async move {
            // Err means the coordinator is gone, nothing left to wait for.
            let _ = rx.wait_for(|stop| *stop).await;
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
