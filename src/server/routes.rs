use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{
    download_export, export_scrape, get_progress, start_scrape, stop_scrape, AppState,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/scrape/start", post(start_scrape))
        .route("/api/scrape/stop", post(stop_scrape))
        .route("/api/scrape/export", post(export_scrape))
        .route("/api/scrape/progress", get(get_progress))
        .route("/download_excel/", get(download_export))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
