//! Report API server lifecycle.
//!
//! bind → spawn background task → return handle with shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::report_api_router;
use crate::api::types::AppState;

/// Handle to a running report API server.
pub struct ReportServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ReportServer {
    /// Address actually bound (resolves port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Send the shutdown signal. In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Report server shutdown signal sent");
        }
    }

    /// Wait until the server task has exited.
    pub async fn stopped(self) {
        if let Err(e) = self.task.await {
            tracing::error!("Report server task failed: {e}");
        }
    }
}

/// Start the report API server on `addr`.
pub async fn start_report_server(
    state: AppState,
    addr: SocketAddr,
) -> Result<ReportServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind report server on {addr}: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = report_api_router(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Report server received shutdown signal");
        };

        tracing::info!(%addr, "Report server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Report server error: {e}");
        }

        tracing::info!("Report server stopped");
    });

    Ok(ReportServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

/// Run until Ctrl-C, then shut down gracefully.
pub async fn serve_until_ctrl_c(state: AppState, addr: SocketAddr) -> Result<(), String> {
    let mut server = start_report_server(state, addr).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl-C: {e}"))?;
    tracing::info!("Ctrl-C received");

    server.shutdown();
    server.stopped().await;
    Ok(())
}
