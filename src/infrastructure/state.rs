//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::outbound::WorkflowSnapshotPort;
use crate::application::services::{BookGenerationService, WorkflowService};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::export::TextbookExporter;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::persistence::create_snapshot_repository;

/// Shared application state
pub struct AppState {
    pub workflow_service: WorkflowService<OllamaClient>,
    pub exporter: TextbookExporter,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // Initialize snapshot storage
        let snapshots = create_snapshot_repository(&config.persistence).await?;
        Ok(Self::with_snapshots(config, snapshots).await)
    }

    /// Build the state around an already opened snapshot store
    pub async fn with_snapshots(
        config: AppConfig,
        snapshots: Arc<dyn WorkflowSnapshotPort>,
    ) -> Self {
        // Initialize Ollama client
        let llm_client = OllamaClient::new(&config.ollama_base_url, &config.ollama_model);
        let generator =
            BookGenerationService::new(llm_client).with_temperature(config.llm_temperature);

        // Restore the workflow from its last snapshot
        let workflow_service = WorkflowService::load(snapshots, generator)
            .await
            .with_strict_navigation(config.strict_navigation);

        let exporter = TextbookExporter::new(config.book_title);

        Self {
            workflow_service,
            exporter,
        }
    }
}
