//! HTTP REST API routes

mod chapter_routes;
mod content_routes;
mod error;
mod export_routes;
mod workflow_routes;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub use error::ApiError;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Workflow routes
        .route("/api/workflow", get(workflow_routes::get_workflow))
        .route("/api/workflow/reset", post(workflow_routes::reset_workflow))
        .route("/api/workflow/step", put(workflow_routes::go_to_step))
        .route("/api/workflow/activity", get(workflow_routes::get_activity))
        .route("/api/workflow/syllabus", put(workflow_routes::set_syllabus))
        .route(
            "/api/workflow/curriculum",
            post(workflow_routes::extract_curriculum),
        )
        .route(
            "/api/workflow/guidelines",
            put(workflow_routes::set_guidelines),
        )
        // Content routes
        .route("/api/content/approval", get(content_routes::get_approval))
        .route("/api/content/{subtopic}", put(content_routes::save_edit))
        .route(
            "/api/content/{subtopic}/generate",
            post(content_routes::generate_content),
        )
        .route(
            "/api/content/{subtopic}/approve",
            post(content_routes::approve_content),
        )
        .route(
            "/api/content/{subtopic}/ai-edit",
            post(content_routes::ai_edit),
        )
        // Chapter routes
        .route(
            "/api/chapters/{title}/refine",
            post(chapter_routes::refine_chapter),
        )
        .route(
            "/api/chapters/{title}/questions",
            post(chapter_routes::generate_questions),
        )
        .route(
            "/api/chapters/{title}/visuals",
            put(chapter_routes::set_visuals),
        )
        // Export routes
        .route("/api/export/{format}", get(export_routes::export_textbook))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::ports::outbound::WorkflowSnapshotPort;
    use crate::domain::aggregates::WorkflowAggregate;
    use crate::domain::entities::{Chapter, Curriculum, CurriculumChapter, QuestionAnswer};
    use crate::infrastructure::config::{AppConfig, PersistenceConfig, SnapshotBackend};
    use crate::infrastructure::persistence::InMemorySnapshotRepository;

    fn test_config() -> AppConfig {
        AppConfig {
            // Nothing listens here, so every generation call fails fast
            ollama_base_url: "http://127.0.0.1:9/v1".to_string(),
            ollama_model: "llama3.2".to_string(),
            llm_temperature: 0.7,
            persistence: PersistenceConfig {
                backend: SnapshotBackend::Memory,
                sqlite_path: String::new(),
            },
            book_title: "Your New Science Textbook".to_string(),
            strict_navigation: false,
            server_port: 0,
        }
    }

    async fn app_with(state: WorkflowAggregate) -> Router {
        let snapshots = Arc::new(InMemorySnapshotRepository::new());
        snapshots.save(&state).await.unwrap();
        let state = AppState::with_snapshots(test_config(), snapshots).await;
        create_routes().with_state(Arc::new(state))
    }

    async fn app() -> Router {
        app_with(WorkflowAggregate::new()).await
    }

    fn with_curriculum() -> WorkflowAggregate {
        let mut state = WorkflowAggregate::new();
        state.set_curriculum(Some(Curriculum::new(vec![CurriculumChapter::new(
            "Cells",
            vec!["Cell Wall".to_string(), "Nucleus".to_string()],
        )])));
        state
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_workflow_initial_state() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/workflow", None).await;

        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["current_step"]["number"], 1);
        assert_eq!(body["steps"].as_array().unwrap().len(), 7);
        assert!(body["curriculum"].is_null());
    }

    #[tokio::test]
    async fn test_blocked_navigation_is_not_an_error() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/workflow/step",
            Some(serde_json::json!({"step": 2})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["moved"], false);
        assert_eq!(body["current_step"], 1);
        assert!(body["notice"].is_string());
    }

    #[tokio::test]
    async fn test_syllabus_is_stored() {
        let app = app().await;
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/workflow/syllabus",
            Some(serde_json::json!({"text": "Unit 1: Cells"})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, Method::GET, "/api/workflow", None).await;
        assert_eq!(json(&body)["syllabus_text"], "Unit 1: Cells");
    }

    #[tokio::test]
    async fn test_extract_without_syllabus_is_bad_request() {
        let app = app().await;
        let (status, body) = send(&app, Method::POST, "/api/workflow/curriculum", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "validation");
    }

    #[tokio::test]
    async fn test_unreachable_model_is_bad_gateway() {
        let mut state = WorkflowAggregate::new();
        state.set_syllabus_text("Unit 1: Cells");
        let app = app_with(state).await;

        let (status, body) = send(&app, Method::POST, "/api/workflow/curriculum", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json(&body)["error"], "generation");

        let (_, body) = send(&app, Method::GET, "/api/workflow/activity", None).await;
        assert!(json(&body)["curriculum"].is_null());
    }

    #[tokio::test]
    async fn test_manual_edit_approves_content() {
        let app = app_with(with_curriculum()).await;
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/content/Cell%20Wall",
            Some(serde_json::json!({"content": "A rigid layer."})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["status"], "approved");

        let (_, body) = send(&app, Method::GET, "/api/workflow", None).await;
        assert_eq!(json(&body)["content"]["Cell Wall"]["content"], "A rigid layer.");
    }

    #[tokio::test]
    async fn test_approving_missing_content_is_not_found() {
        let app = app_with(with_curriculum()).await;
        let (status, body) = send(&app, Method::POST, "/api/content/Nucleus/approve", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["error"], "not_found");
    }

    #[tokio::test]
    async fn test_edit_for_unknown_subtopic_is_not_found() {
        let app = app_with(with_curriculum()).await;
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/content/Volcanoes",
            Some(serde_json::json!({"content": "Lava."})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["error"], "not_found");

        let (_, body) = send(&app, Method::GET, "/api/workflow", None).await;
        assert!(json(&body)["content"]["Volcanoes"].is_null());
    }

    #[tokio::test]
    async fn test_export_markdown_download() {
        let mut state = WorkflowAggregate::new();
        state
            .upsert_chapter(
                Chapter::new("Cells", "Cells are the unit of life.")
                    .with_subtopics(vec!["Cell Wall".to_string()]),
            )
            .unwrap();
        state.set_questions("Cells", vec![QuestionAnswer::new("What is a cell?", "A unit")]);
        let app = app_with(state).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/export/md")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/markdown"));
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"textbook.md\""
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let markdown = String::from_utf8(body.to_vec()).unwrap();
        assert!(markdown.contains("## Chapter 1: Cells"));
        assert!(markdown.contains("**Q:** What is a cell?"));
    }

    #[tokio::test]
    async fn test_export_errors() {
        let app = app().await;
        let (status, _) = send(&app, Method::GET, "/api/export/md", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/api/export/pdf", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["message"].as_str().unwrap().contains("pdf"));
    }

    #[tokio::test]
    async fn test_reset_clears_state() {
        let mut state = WorkflowAggregate::new();
        state.set_syllabus_text("Old syllabus");
        let app = app_with(state).await;

        let (status, body) = send(&app, Method::POST, "/api/workflow/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["syllabus_text"], "");
    }
}
