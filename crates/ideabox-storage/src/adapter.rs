// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of [`StorageAdapter`].

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use ideabox_config::model::StorageConfig;
use ideabox_core::{
    AdapterType, EnrichedPayload, HealthStatus, IdeaFilter, IdeaId, IdeaRecord, IdeaStatus,
    IdeaSummary, IdeaboxError, PluginAdapter, StorageAdapter, Submission,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage. The database is opened by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, IdeaboxError> {
        self.db.get().ok_or_else(|| IdeaboxError::Storage {
            source: "storage not initialized, call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, IdeaboxError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), IdeaboxError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), IdeaboxError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| IdeaboxError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), IdeaboxError> {
        self.db()?.checkpoint().await
    }

    async fn create_record(&self, submission: &Submission) -> Result<IdeaRecord, IdeaboxError> {
        queries::ideas::create_record(self.db()?, submission).await
    }

    async fn get_record(&self, id: IdeaId) -> Result<Option<IdeaRecord>, IdeaboxError> {
        queries::ideas::get_record(self.db()?, id).await
    }

    async fn list_active_summaries(&self, limit: usize) -> Result<Vec<IdeaSummary>, IdeaboxError> {
        queries::ideas::list_active_summaries(self.db()?, limit).await
    }

    async fn attach_enrichment(
        &self,
        id: IdeaId,
        payload: &EnrichedPayload,
    ) -> Result<(), IdeaboxError> {
        queries::ideas::attach_enrichment(self.db()?, id, payload).await
    }

    async fn list_records(&self, filter: &IdeaFilter) -> Result<Vec<IdeaRecord>, IdeaboxError> {
        queries::ideas::list_records(self.db()?, filter).await
    }

    async fn count_records(&self, filter: &IdeaFilter) -> Result<u64, IdeaboxError> {
        queries::ideas::count_records(self.db()?, filter).await
    }

    async fn update_status(&self, id: IdeaId, status: IdeaStatus) -> Result<bool, IdeaboxError> {
        queries::ideas::update_status(self.db()?, id, status).await
    }

    async fn update_notes(&self, id: IdeaId, notes: &str) -> Result<bool, IdeaboxError> {
        queries::ideas::update_notes(self.db()?, id, notes).await
    }

    async fn delete_record(&self, id: IdeaId) -> Result<bool, IdeaboxError> {
        queries::ideas::delete_record(self.db()?, id).await
    }
}

#[cfg(test)]
mod tests {
    use ideabox_core::{Origin, Submitter};
    use tempfile::tempdir;

    use super::*;

    fn storage_at(dir: &tempfile::TempDir, name: &str) -> (SqliteStorage, std::path::PathBuf) {
        let path = dir.path().join(name);
        let storage = SqliteStorage::new(StorageConfig {
            database_path: path.display().to_string(),
            wal_mode: true,
        });
        (storage, path)
    }

    #[tokio::test]
    async fn reports_identity() {
        let dir = tempdir().unwrap();
        let (storage, _) = storage_at(&dir, "id.db");
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_fails() {
        let dir = tempdir().unwrap();
        let (storage, path) = storage_at(&dir, "twice.db");
        storage.initialize().await.unwrap();
        assert!(path.exists());
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let (storage, _) = storage_at(&dir, "uninit.db");
        assert!(storage.health_check().await.is_err());
        assert!(storage.get_record(IdeaId(1)).await.is_err());
        // Shutdown of a never-opened store is a no-op.
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let (storage, _) = storage_at(&dir, "persist.db");
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);

        let submission = Submission {
            text: "export ideas as csv".into(),
            submitter: Submitter {
                id: 42,
                username: None,
                first_name: "Dana".into(),
            },
            origin: Origin {
                chat_id: 1,
                message_id: 2,
            },
        };
        let created = storage.create_record(&submission).await.unwrap();
        storage.close().await.unwrap();
        drop(storage);

        let (reopened, _) = storage_at(&dir, "persist.db");
        reopened.initialize().await.unwrap();
        let fetched = reopened.get_record(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }
}
