//! HTTP surface for the scraper
//!
//! Exposes the session controls (start, stop, export, progress) consumed by a
//! dashboard, and the download endpoint serving the latest export.

mod handlers;
mod routes;

pub use handlers::{
    AppState, ErrorResponse, ExportResponse, ProgressResponse, StartResponse, StopResponse,
};
pub use routes::create_router;

use crate::config::Config;
use crate::crawler::{ScrapeSession, SessionError};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}

/// Serves the control and download endpoints until shutdown is requested
///
/// A crawl still running at shutdown is stopped (and its partial results
/// exported) before this returns.
pub async fn start_server(config: &Config, session: Arc<ScrapeSession>) -> std::io::Result<()> {
    let app = create_router(AppState {
        session: Arc::clone(&session),
        poll_interval_ms: config.server.poll_interval_ms,
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    info!("  POST /api/scrape/start     start a scrape");
    info!("  POST /api/scrape/stop      stop the running scrape");
    info!("  POST /api/scrape/export    re-export the current records");
    info!("  GET  /api/scrape/progress  live progress");
    info!("  GET  /download_excel/      latest export");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    match session.stop().await {
        Ok(stopped) => info!(
            "Stopped running scrape with {} records",
            stopped.report.total_records
        ),
        Err(SessionError::NotRunning) => {}
        Err(e) => tracing::error!("Failed to stop scrape on shutdown: {}", e),
    }

    Ok(())
}
