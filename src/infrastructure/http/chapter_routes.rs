//! Chapter REST API routes - refinement, practice questions and visual notes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::dto::VisualsRequestDto;
use crate::domain::entities::{Chapter, QuestionAnswer};
use crate::infrastructure::http::ApiError;
use crate::infrastructure::state::AppState;

/// Refine a chapter, replacing any earlier refinement of it
pub async fn refine_chapter(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> Result<Json<Chapter>, ApiError> {
    let chapter = state.workflow_service.refine_chapter(&title).await?;
    Ok(Json(chapter))
}

pub async fn generate_questions(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> Result<Json<Vec<QuestionAnswer>>, ApiError> {
    let questions = state.workflow_service.generate_questions(&title).await?;
    Ok(Json(questions))
}

pub async fn set_visuals(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
    Json(req): Json<VisualsRequestDto>,
) -> Result<StatusCode, ApiError> {
    state.workflow_service.set_visuals(&title, req.notes).await?;
    Ok(StatusCode::NO_CONTENT)
}
