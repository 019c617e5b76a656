//! Content REST API routes - per-subtopic generation, editing and approval

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::dto::{AiEditRequestDto, EditContentRequestDto};
use crate::application::services::ApprovalReport;
use crate::domain::entities::ContentItem;
use crate::infrastructure::http::ApiError;
use crate::infrastructure::state::AppState;

/// Approval gate status for leaving content generation
pub async fn get_approval(State(state): State<Arc<AppState>>) -> Json<ApprovalReport> {
    Json(state.workflow_service.approval_report().await)
}

/// Generate or regenerate one subtopic's content
pub async fn generate_content(
    State(state): State<Arc<AppState>>,
    Path(subtopic): Path<String>,
) -> Result<Json<ContentItem>, ApiError> {
    let item = state
        .workflow_service
        .generate_subtopic_content(&subtopic)
        .await?;
    Ok(Json(item))
}

pub async fn approve_content(
    State(state): State<Arc<AppState>>,
    Path(subtopic): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.workflow_service.approve_content(&subtopic).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Save a manual edit, which also approves the content
pub async fn save_edit(
    State(state): State<Arc<AppState>>,
    Path(subtopic): Path<String>,
    Json(req): Json<EditContentRequestDto>,
) -> Result<Json<ContentItem>, ApiError> {
    let item = state
        .workflow_service
        .save_edit(&subtopic, req.content)
        .await?;
    Ok(Json(item))
}

pub async fn ai_edit(
    State(state): State<Arc<AppState>>,
    Path(subtopic): Path<String>,
    Json(req): Json<AiEditRequestDto>,
) -> Result<Json<ContentItem>, ApiError> {
    let item = state
        .workflow_service
        .ai_edit(&subtopic, &req.instruction)
        .await?;
    Ok(Json(item))
}
