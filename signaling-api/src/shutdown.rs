//! Graceful shutdown.

use std::future::Future;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Waits for SIGTERM or SIGINT.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}

/// Runs `server` until it stops or `shutdown` resolves.
///
/// Once `shutdown` resolves, `drain` is set and the server gets `timeout` to
/// finish in-flight requests.
///
/// # Errors
///
/// Returns the server's own error. Abandoning a server stuck past `timeout`
/// is not an error.
pub async fn run_with_graceful_shutdown<F, E, S>(
    server: F,
    shutdown: S,
    drain: watch::Sender<bool>,
    timeout: Duration,
) -> Result<(), E>
where
    F: Future<Output = Result<(), E>> + Send,
    E: std::fmt::Display,
    S: Future<Output = ()> + Send,
{
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            log_exit(&result);
            return result;
        }
        () = shutdown => {
            info!("Shutdown signal received");
        }
    }

    let _ = drain.send(true);
    let result = match tokio::time::timeout(timeout, &mut server).await {
        Ok(result) => {
            log_exit(&result);
            result
        }
        Err(_) => {
            warn!(?timeout, "Shutdown timeout reached, dropping open connections");
            Ok(())
        }
    };
    info!("Shutdown complete");
    result
}

fn log_exit<E: std::fmt::Display>(result: &Result<(), E>) {
    match result {
        Ok(()) => info!("Server stopped normally"),
        Err(e) => error!(error = %e, "Server error"),
    }
}
