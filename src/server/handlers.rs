use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::crawler::{ProgressUpdate, ScrapeSession, SessionError};
use crate::output::EXPORT_MIME_TYPE;
use crate::state::Termination;
use crate::ScrapeError;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ScrapeSession>,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub status: &'static str,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub status: &'static str,
    pub termination: Termination,
    pub pages_processed: u32,
    pub total_records: usize,
    pub export_path: Option<String>,
    pub export_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub path: String,
    pub rows: usize,
    pub sha256: String,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    #[serde(flatten)]
    pub progress: ProgressUpdate,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn rejection(status: StatusCode, error: &SessionError) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

pub async fn start_scrape(State(state): State<AppState>) -> Response {
    match state.session.start().await {
        Ok(started) => {
            info!("Scrape started via API");
            (
                StatusCode::ACCEPTED,
                Json(StartResponse {
                    status: "Scraping in progress...",
                    started_at: started.started_at,
                }),
            )
                .into_response()
        }
        Err(e @ SessionError::AlreadyRunning) => {
            warn!("Rejected start: {}", e);
            rejection(StatusCode::CONFLICT, &e)
        }
        Err(e) => {
            error!("Failed to start scrape: {}", e);
            rejection(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

pub async fn stop_scrape(State(state): State<AppState>) -> Response {
    match state.session.stop().await {
        Ok(stopped) => {
            let outcome = stopped.report.outcome();
            Json(StopResponse {
                status: "Scraping stopped.",
                termination: outcome.termination,
                pages_processed: stopped.report.pages_processed,
                total_records: stopped.report.total_records,
                export_path: outcome.export_path,
                export_error: outcome.export_error,
            })
            .into_response()
        }
        Err(e @ SessionError::NotRunning) => {
            warn!("Rejected stop: {}", e);
            rejection(StatusCode::CONFLICT, &e)
        }
        Err(e) => {
            error!("Failed to stop scrape: {}", e);
            rejection(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

pub async fn export_scrape(State(state): State<AppState>) -> Response {
    match state.session.export().await {
        Ok(summary) => {
            info!("Re-exported {} records via API", summary.rows);
            Json(ExportResponse {
                path: summary.path.display().to_string(),
                rows: summary.rows,
                sha256: summary.sha256,
            })
            .into_response()
        }
        Err(ScrapeError::Session(e @ SessionError::AlreadyRunning)) => {
            warn!("Rejected export: {}", e);
            rejection(StatusCode::CONFLICT, &e)
        }
        Err(e) => {
            error!("Export failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn get_progress(State(state): State<AppState>) -> Json<ProgressResponse> {
    Json(ProgressResponse {
        progress: ProgressUpdate::from(state.session.snapshot()),
        poll_interval_ms: state.poll_interval_ms,
    })
}

pub async fn download_export(State(state): State<AppState>) -> Response {
    let path = state.session.export_path();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export.xlsx".to_string());

    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, EXPORT_MIME_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file_name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "No export available yet").into_response()
        }
        Err(e) => {
            error!("Failed to read export {}: {}", path.display(), e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
