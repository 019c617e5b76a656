use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::application::ports::outbound::{
    SnapshotError, WorkflowSnapshotPort, WORKFLOW_SNAPSHOT_KEY,
};
use crate::domain::aggregates::WorkflowAggregate;

/// SQLite-backed snapshot store: one row per storage key
pub struct SqliteSnapshotRepository {
    pool: SqlitePool,
}

impl SqliteSnapshotRepository {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        // Create table if not exists
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS workflow_snapshots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
        "#).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// When the snapshot was last written, if ever
    pub async fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>, SnapshotError> {
        let row: Option<(DateTime<Utc>,)> =
            sqlx::query_as("SELECT updated_at FROM workflow_snapshots WHERE key = ?")
                .bind(WORKFLOW_SNAPSHOT_KEY)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| SnapshotError::Database(e.to_string()))?;
        Ok(row.map(|(updated_at,)| updated_at))
    }
}

#[async_trait]
impl WorkflowSnapshotPort for SqliteSnapshotRepository {
    async fn load(&self) -> Result<Option<WorkflowAggregate>, SnapshotError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM workflow_snapshots WHERE key = ?")
                .bind(WORKFLOW_SNAPSHOT_KEY)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| SnapshotError::Database(e.to_string()))?;

        match row {
            Some((value,)) => serde_json::from_str(&value)
                .map(Some)
                .map_err(|e| SnapshotError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &WorkflowAggregate) -> Result<(), SnapshotError> {
        let value = serde_json::to_string(state)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        sqlx::query("INSERT OR REPLACE INTO workflow_snapshots (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(WORKFLOW_SNAPSHOT_KEY)
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| SnapshotError::Database(e.to_string()))?;

        tracing::debug!("Saved workflow snapshot at step {}", state.current_step());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SnapshotError> {
        sqlx::query("DELETE FROM workflow_snapshots WHERE key = ?")
            .bind(WORKFLOW_SNAPSHOT_KEY)
            .execute(&self.pool)
            .await
            .map_err(|e| SnapshotError::Database(e.to_string()))?;

        tracing::debug!("Cleared workflow snapshot");
        Ok(())
    }
}

/// Process-local snapshot store, stored as serialized JSON so it behaves
/// like the SQLite store (including round-trip failures)
#[derive(Default)]
pub struct InMemorySnapshotRepository {
    value: RwLock<Option<String>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowSnapshotPort for InMemorySnapshotRepository {
    async fn load(&self) -> Result<Option<WorkflowAggregate>, SnapshotError> {
        match self.value.read().await.as_deref() {
            Some(value) => serde_json::from_str(value)
                .map(Some)
                .map_err(|e| SnapshotError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn save(&self, state: &WorkflowAggregate) -> Result<(), SnapshotError> {
        let value = serde_json::to_string(state)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        *self.value.write().await = Some(value);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SnapshotError> {
        *self.value.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::domain::entities::ContentItem;
    use crate::domain::value_objects::WorkflowStep;

    async fn sqlite_repository() -> SqliteSnapshotRepository {
        // A single connection keeps the in-memory database alive and shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite should open");
        SqliteSnapshotRepository::new(pool)
            .await
            .expect("schema should be created")
    }

    fn sample_state() -> WorkflowAggregate {
        let mut state = WorkflowAggregate::new();
        state.set_syllabus_text("Unit 1: Cells");
        state.set_content("Nucleus", ContentItem::edited("control centre"));
        state.go_to_step(2);
        state
    }

    #[tokio::test]
    async fn test_sqlite_load_without_snapshot_is_none() {
        let repository = sqlite_repository().await;
        assert!(repository.load().await.unwrap().is_none());
        assert!(repository.last_saved_at().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_save_overwrites_and_clear_removes() {
        let repository = sqlite_repository().await;
        let mut state = sample_state();
        repository.save(&state).await.unwrap();

        state.go_to_step(3);
        repository.save(&state).await.unwrap();

        let loaded = repository.load().await.unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.current_step(), WorkflowStep::ContentGeneration);
        assert!(repository.last_saved_at().await.unwrap().is_some());

        repository.clear().await.unwrap();
        assert!(repository.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_corrupt_snapshot_is_serialization_error() {
        let repository = sqlite_repository().await;
        sqlx::query("INSERT INTO workflow_snapshots (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(WORKFLOW_SNAPSHOT_KEY)
            .bind("{not json")
            .bind(Utc::now())
            .execute(&repository.pool)
            .await
            .unwrap();

        let result = repository.load().await;
        assert!(matches!(result, Err(SnapshotError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let repository = InMemorySnapshotRepository::new();
        assert!(repository.load().await.unwrap().is_none());

        let state = sample_state();
        repository.save(&state).await.unwrap();
        assert_eq!(repository.load().await.unwrap(), Some(state));

        repository.clear().await.unwrap();
        assert!(repository.load().await.unwrap().is_none());
    }
}
