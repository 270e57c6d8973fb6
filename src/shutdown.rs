//! Shutdown signal handling.
//!
//! SIGINT (Ctrl+C), and SIGTERM on Unix, cancel a [`CancellationToken`] that
//! long-running loops watch.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Spawn a background task that cancels the returned token on the first
/// shutdown signal.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => trigger.cancel(),
            _ = trigger.cancelled() => {}
        }
        debug!("shutdown signal handler completed");
    });

    token
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => match result {
                        Ok(()) => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        Err(e) => warn!("failed to listen for Ctrl+C, shutting down: {}", e),
                    },
                    _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                }
                return;
            }
            Err(e) => warn!("failed to install SIGTERM handler: {}", e),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, initiating shutdown"),
        Err(e) => {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
