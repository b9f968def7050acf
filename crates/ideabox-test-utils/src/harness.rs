// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A complete intake stack over mock adapters.
//!
//! By default the harness uses a real SQLite database in a temp directory;
//! `with_storage` swaps in another backend such as [`MemoryStore`].
//!
//! [`MemoryStore`]: crate::MemoryStore

use std::sync::Arc;
use std::time::Duration;

use ideabox_config::model::StorageConfig;
use ideabox_core::{IdeaboxError, StorageAdapter, Submission};
use ideabox_intake::{IntakeError, IntakeOutcome, IntakePipeline, IntakeSettings, RateLimiter};
use ideabox_storage::SqliteStorage;

use crate::mock_provider::MockProvider;

pub struct TestHarnessBuilder {
    responses: Vec<String>,
    per_user: u32,
    global: u32,
    settings: IntakeSettings,
    instructions: String,
    storage: Option<Arc<dyn StorageAdapter>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            per_user: 5,
            global: 50,
            settings: IntakeSettings::default(),
            instructions: "Analyze the idea.".to_string(),
            storage: None,
        }
    }

    /// Model answers, consumed in call order.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_quotas(mut self, per_user: u32, global: u32) -> Self {
        self.per_user = per_user;
        self.global = global;
        self
    }

    pub fn with_llm_budget(mut self, budget: Duration) -> Self {
        self.settings.llm_budget = budget;
        self
    }

    pub fn with_candidate_window(mut self, window: usize) -> Self {
        self.settings.candidate_window = window;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub async fn build(self) -> Result<TestHarness, IdeaboxError> {
        let temp_dir = tempfile::tempdir().map_err(|e| IdeaboxError::Internal(e.to_string()))?;
        let storage: Arc<dyn StorageAdapter> = match self.storage {
            Some(storage) => storage,
            None => {
                let path = temp_dir.path().join("ideas.db");
                let sqlite = SqliteStorage::new(StorageConfig {
                    database_path: path.display().to_string(),
                    wal_mode: true,
                });
                sqlite.initialize().await?;
                Arc::new(sqlite)
            }
        };

        let provider = Arc::new(MockProvider::with_responses(self.responses));
        let limiter = Arc::new(RateLimiter::new(self.per_user, self.global));
        let pipeline = Arc::new(IntakePipeline::new(
            self.settings,
            limiter,
            storage.clone(),
            provider.clone(),
            &self.instructions,
        ));

        Ok(TestHarness {
            pipeline,
            storage,
            provider,
            _temp_dir: temp_dir,
        })
    }
}

pub struct TestHarness {
    pub pipeline: Arc<IntakePipeline>,
    pub storage: Arc<dyn StorageAdapter>,
    pub provider: Arc<MockProvider>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn submit(&self, submission: Submission) -> Result<IntakeOutcome, IntakeError> {
        self.pipeline.submit(submission).await
    }
}
