//! Interrupt signal wiring
//!
//! The watch loop stops between dispatches when the process receives
//! SIGINT or SIGTERM. Both signals are merged into one broadcast channel
//! so the pipeline only has to listen on a single receiver.

use tokio::sync::broadcast;

use crate::{Error, Result};

/// Create the interrupt channel for SIGINT and SIGTERM.
///
/// The returned receiver yields a value when either signal is detected.
pub async fn interrupt_channel() -> Result<broadcast::Receiver<()>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|e| Error::invalid_config(format!("Failed to setup SIGINT: {e}")))?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| Error::invalid_config(format!("Failed to setup SIGTERM: {e}")))?;

        let (tx, rx) = broadcast::channel(1);
        let sigterm_tx = tx.clone();

        // Forward signals to the channel; the tasks end with the process.
        tokio::spawn(async move {
            let _ = sigint.recv().await;
            tracing::info!("Received SIGINT");
            let _ = tx.send(());
        });
        tokio::spawn(async move {
            let _ = sigterm.recv().await;
            tracing::info!("Received SIGTERM");
            let _ = sigterm_tx.send(());
        });

        Ok(rx)
    }

    #[cfg(not(unix))]
    {
        // On non-Unix platforms, use Ctrl-C.
        let (tx, rx) = broadcast::channel(1);
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received Ctrl-C");
            let _ = tx.send(());
        });
        Ok(rx)
    }
}
