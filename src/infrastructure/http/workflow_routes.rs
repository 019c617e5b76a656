//! Workflow REST API routes - state, navigation, syllabus and guidelines

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::application::dto::{
    GuidelinesRequestDto, NavigationRequestDto, SyllabusRequestDto, WorkflowStateDto,
};
use crate::application::services::{ActivitySnapshot, NavigationOutcome};
use crate::domain::entities::Curriculum;
use crate::infrastructure::http::ApiError;
use crate::infrastructure::state::AppState;

/// Full workflow state
pub async fn get_workflow(State(state): State<Arc<AppState>>) -> Json<WorkflowStateDto> {
    let snapshot = state.workflow_service.snapshot().await;
    Json(WorkflowStateDto::from(&snapshot))
}

/// Clear everything and return to step 1
pub async fn reset_workflow(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WorkflowStateDto>, ApiError> {
    state.workflow_service.reset().await?;
    let snapshot = state.workflow_service.snapshot().await;
    Ok(Json(WorkflowStateDto::from(&snapshot)))
}

/// Move to another step. A blocked move is a 200 with `moved: false`.
pub async fn go_to_step(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NavigationRequestDto>,
) -> Result<Json<NavigationOutcome>, ApiError> {
    let outcome = state.workflow_service.go_to_step(req.step).await?;
    Ok(Json(outcome))
}

/// Which keys currently have a generation call in flight
pub async fn get_activity(State(state): State<Arc<AppState>>) -> Json<ActivitySnapshot> {
    Json(state.workflow_service.activity().await)
}

pub async fn set_syllabus(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SyllabusRequestDto>,
) -> Result<StatusCode, ApiError> {
    state.workflow_service.set_syllabus_text(req.text).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Extract the curriculum from the stored syllabus
pub async fn extract_curriculum(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Curriculum>, ApiError> {
    let curriculum = state.workflow_service.extract_curriculum().await?;
    Ok(Json(curriculum))
}

pub async fn set_guidelines(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GuidelinesRequestDto>,
) -> Result<StatusCode, ApiError> {
    state
        .workflow_service
        .set_editorial_guidelines(req.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
