//! Process shutdown coordination.
//!
//! SIGINT/SIGTERM stop the server gracefully. A panic anywhere in the
//! process is treated as fatal: it is logged, the listener drains in-flight
//! requests, and `main` exits with status 1.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{error, info};

#[derive(Clone, Default)]
pub struct Shutdown {
    notify: Arc<Notify>,
    fatal: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route panics through tracing and turn them into a fatal shutdown
    pub fn install_panic_hook(&self) {
        let shutdown = self.clone();
        let previous = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown location".to_string());
            let message = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());

            error!("Fatal panic at {}: {}", location, message);
            previous(panic_info);
            shutdown.trigger_fatal();
        }));
    }

    pub fn trigger_fatal(&self) {
        self.fatal.store(true, Ordering::SeqCst);
        // notify_one keeps a permit if nobody is waiting yet
        self.notify.notify_one();
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.load(Ordering::SeqCst)
    }

    /// Resolves on SIGINT, SIGTERM or a fatal panic
    pub async fn wait(self) {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for SIGINT: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!("Failed to listen for SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received SIGINT, shutting down"),
            _ = terminate => info!("Received SIGTERM, shutting down"),
            _ = self.notify.notified() => error!("Shutting down after fatal error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fatal_trigger_releases_waiter() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_fatal());

        shutdown.trigger_fatal();

        tokio::time::timeout(Duration::from_secs(1), shutdown.clone().wait())
            .await
            .unwrap();
        assert!(shutdown.is_fatal());
    }
}
