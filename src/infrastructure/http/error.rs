//! JSON error responses for the REST API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::services::WorkflowError;
use crate::infrastructure::export::ExportError;

/// Error returned by route handlers, rendered as `{ "error", "message" }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "validation",
            message: message.into(),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let (status, kind) = match &err {
            WorkflowError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            WorkflowError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            WorkflowError::Generation(_) => (StatusCode::BAD_GATEWAY, "generation"),
            WorkflowError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence"),
        };
        Self {
            status,
            kind,
            message: err.to_string(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.kind,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
