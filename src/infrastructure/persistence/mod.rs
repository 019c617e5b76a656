//! Snapshot persistence adapters
//!
//! The workflow is persisted as a single serialized snapshot. Two backends
//! implement [`WorkflowSnapshotPort`]: SQLite for durable storage and an
//! in-memory store for ephemeral runs and tests.

mod snapshot_repository;

pub use snapshot_repository::{InMemorySnapshotRepository, SqliteSnapshotRepository};

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use crate::application::ports::outbound::WorkflowSnapshotPort;
use crate::infrastructure::config::{PersistenceConfig, SnapshotBackend};

/// Open the configured snapshot backend
pub async fn create_snapshot_repository(
    config: &PersistenceConfig,
) -> Result<Arc<dyn WorkflowSnapshotPort>> {
    match config.backend {
        SnapshotBackend::Memory => {
            tracing::info!("Using in-memory workflow snapshot store");
            Ok(Arc::new(InMemorySnapshotRepository::new()))
        }
        SnapshotBackend::Sqlite => {
            // Ensure data directory exists
            if let Some(parent) = std::path::Path::new(&config.sqlite_path).parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create snapshot database directory")?;
            }

            let options = SqliteConnectOptions::new()
                .filename(&config.sqlite_path)
                .create_if_missing(true);
            let pool = SqlitePool::connect_with(options)
                .await
                .context("Failed to connect to SQLite snapshot database")?;
            tracing::info!("Connected to SQLite snapshot database: {}", config.sqlite_path);

            let repository = SqliteSnapshotRepository::new(pool)
                .await
                .context("Failed to initialize snapshot schema")?;
            if let Some(saved_at) = repository.last_saved_at().await? {
                tracing::info!("Found workflow snapshot saved at {}", saved_at);
            }
            Ok(Arc::new(repository))
        }
    }
}
