use async_trait::async_trait;

use crate::domain::aggregates::WorkflowAggregate;

/// Fixed key the workflow snapshot is stored under
pub const WORKFLOW_SNAPSHOT_KEY: &str = "bookCreationState";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Storage for the single workflow snapshot.
///
/// `load` returns `Ok(None)` when nothing has been saved yet.
#[async_trait]
pub trait WorkflowSnapshotPort: Send + Sync {
    async fn load(&self) -> Result<Option<WorkflowAggregate>, SnapshotError>;
    async fn save(&self, state: &WorkflowAggregate) -> Result<(), SnapshotError>;
    async fn clear(&self) -> Result<(), SnapshotError>;
}
