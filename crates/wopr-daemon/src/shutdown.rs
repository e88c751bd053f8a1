//! Graceful shutdown signal handling.
//!
//! Grounded on `querymt-querymt`'s `agent/src/acp/shutdown.rs`: races
//! `SIGINT`/Ctrl+C against `SIGTERM` (Unix only) so the daemon shuts down
//! cleanly under both an interactive Ctrl+C and a process manager's
//! `kill`.

use tokio::signal;

/// Resolves once either `SIGINT` or `SIGTERM` is received.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
