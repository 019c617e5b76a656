//! Export API routes

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::infrastructure::export::ExportFormat;
use crate::infrastructure::http::ApiError;
use crate::infrastructure::state::AppState;

/// Download the textbook as `md`, `html` or `txt`
pub async fn export_textbook(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let format: ExportFormat = format.parse()?;
    let snapshot = state.workflow_service.snapshot().await;
    let body = state.exporter.export(&snapshot, format)?;

    tracing::info!("Exported textbook as {}", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format!("{}; charset=utf-8", format.mime_type())),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        body,
    ))
}
