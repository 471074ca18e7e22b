use tokio::signal;
use tokio::sync::watch;

/// Resolves on Ctrl+C or SIGTERM, whichever arrives first.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

/// Waits for the OS signal, then flips the watch channel so background tasks
/// stop alongside the HTTP server.
pub(crate) async fn shutdown_and_notify(notify: watch::Sender<bool>) {
    shutdown_signal().await;
    if notify.send(true).is_err() {
        tracing::warn!("No background tasks were listening for shutdown");
    }
}
