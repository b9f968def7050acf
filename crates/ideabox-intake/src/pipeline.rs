// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end intake orchestration.
//!
//! Admission, duplicate check and record creation fail fast. Enrichment and
//! its persistence degrade: the idea is kept even when the model or the
//! second write fails.

use std::sync::Arc;
use std::time::Duration;

use ideabox_config::model::IntakeConfig;
use ideabox_core::{
    DuplicateVerdict, EnrichedPayload, IdeaId, IdeaRecord, IdeaboxError, ProviderAdapter,
    StorageAdapter, Submission,
};
use strum::Display;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::duplicate::DuplicateDetector;
use crate::enrich::Enricher;
use crate::rate_limit::RateLimiter;

/// Stand-in deadline when the budget does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Where a submission ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum IntakeStage {
    Admitted,
    Checked,
    Created,
    Enriched,
    RateLimited,
    RejectedDuplicate,
    CreateFailed,
    /// Stored, but without an attached enrichment.
    PartiallyCreated,
}

/// Fail-fast rejections. Nothing was persisted.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("submission quota exceeded")]
    RateLimited,

    #[error("duplicate of idea {similar_id}: {reason}")]
    Duplicate { similar_id: IdeaId, reason: String },

    #[error("failed to store idea: {0}")]
    CreateFailed(#[source] IdeaboxError),
}

impl IntakeError {
    pub fn stage(&self) -> IntakeStage {
        match self {
            Self::RateLimited => IntakeStage::RateLimited,
            Self::Duplicate { .. } => IntakeStage::RejectedDuplicate,
            Self::CreateFailed(_) => IntakeStage::CreateFailed,
        }
    }
}

/// A stored idea, with or without enrichment.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    /// `persisted` is false when the payload could not be written back; the
    /// stored record then lacks it.
    Enriched {
        record: IdeaRecord,
        payload: EnrichedPayload,
        persisted: bool,
    },
    Unenriched { record: IdeaRecord },
}

impl IntakeOutcome {
    pub fn record(&self) -> &IdeaRecord {
        match self {
            Self::Enriched { record, .. } | Self::Unenriched { record } => record,
        }
    }

    pub fn payload(&self) -> Option<&EnrichedPayload> {
        match self {
            Self::Enriched { payload, .. } => Some(payload),
            Self::Unenriched { .. } => None,
        }
    }

    pub fn stage(&self) -> IntakeStage {
        match self {
            Self::Enriched {
                persisted: true, ..
            } => IntakeStage::Enriched,
            Self::Enriched { .. } | Self::Unenriched { .. } => IntakeStage::PartiallyCreated,
        }
    }
}

/// Tunables taken from `[intake]`.
#[derive(Debug, Clone)]
pub struct IntakeSettings {
    pub candidate_window: usize,
    pub llm_budget: Duration,
    pub enrich_max_tokens: u32,
    pub duplicate_max_tokens: u32,
}

impl IntakeSettings {
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self {
            candidate_window: config.candidate_window,
            llm_budget: Duration::from_secs(config.llm_budget_secs),
            enrich_max_tokens: config.enrich_max_tokens,
            duplicate_max_tokens: config.duplicate_max_tokens,
        }
    }
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self::from_config(&IntakeConfig::default())
    }
}

pub struct IntakePipeline {
    settings: IntakeSettings,
    limiter: Arc<RateLimiter>,
    storage: Arc<dyn StorageAdapter>,
    detector: DuplicateDetector,
    enricher: Enricher,
}

impl IntakePipeline {
    pub fn new(
        settings: IntakeSettings,
        limiter: Arc<RateLimiter>,
        storage: Arc<dyn StorageAdapter>,
        provider: Arc<dyn ProviderAdapter>,
        instructions: &str,
    ) -> Self {
        let detector = DuplicateDetector::new(provider.clone(), settings.duplicate_max_tokens);
        let enricher = Enricher::new(provider, instructions, settings.enrich_max_tokens);
        Self {
            settings,
            limiter,
            storage,
            detector,
            enricher,
        }
    }

    /// The limiter this pipeline admits through, for periodic sweeping.
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Runs a submission with the configured model budget.
    pub async fn submit(&self, submission: Submission) -> Result<IntakeOutcome, IntakeError> {
        let deadline = deadline_after(self.settings.llm_budget);
        self.submit_with_deadline(submission, deadline).await
    }

    /// Runs a submission; both model calls share `deadline`. The record
    /// insert is never cut short by it.
    pub async fn submit_with_deadline(
        &self,
        submission: Submission,
        deadline: Instant,
    ) -> Result<IntakeOutcome, IntakeError> {
        let submitter_id = submission.submitter.id;

        if !self.limiter.allow(submitter_id) {
            info!(submitter_id, "submission rate limited");
            return Err(IntakeError::RateLimited);
        }
        debug!(submitter_id, stage = %IntakeStage::Admitted, "submission admitted");

        let candidates = match self
            .storage
            .list_active_summaries(self.settings.candidate_window)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "could not load duplicate candidates, skipping check");
                Vec::new()
            }
        };

        match self
            .detector
            .check(&submission.text, &candidates, deadline)
            .await
        {
            Ok(DuplicateVerdict::Duplicate { similar_id, reason }) => {
                info!(submitter_id, %similar_id, reason = %reason, "submission rejected as duplicate");
                return Err(IntakeError::Duplicate { similar_id, reason });
            }
            Ok(DuplicateVerdict::Unique) => {}
            Err(e) => warn!(error = %e, "duplicate check failed, proceeding"),
        }
        debug!(
            submitter_id,
            candidates = candidates.len(),
            stage = %IntakeStage::Checked,
            "duplicate check done"
        );

        let record = match self.storage.create_record(&submission).await {
            Ok(record) => record,
            Err(e) => {
                error!(submitter_id, error = %e, "failed to create idea record");
                return Err(IntakeError::CreateFailed(e));
            }
        };
        info!(idea_id = %record.id, submitter_id, stage = %IntakeStage::Created, "idea created");

        let payload = match self
            .enricher
            .enrich(
                &submission.text,
                submission.submitter.display_name(),
                deadline,
            )
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!(idea_id = %record.id, error = %e, "enrichment failed, keeping raw idea");
                return Ok(IntakeOutcome::Unenriched { record });
            }
        };

        if let Err(e) = self.storage.attach_enrichment(record.id, &payload).await {
            warn!(idea_id = %record.id, error = %e, "failed to store enrichment");
            return Ok(IntakeOutcome::Enriched {
                record,
                payload,
                persisted: false,
            });
        }

        let record = match self.storage.get_record(record.id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                warn!(idea_id = %record.id, "enriched idea vanished before re-read");
                record
            }
            Err(e) => {
                warn!(idea_id = %record.id, error = %e, "failed to re-read enriched idea");
                record
            }
        };
        info!(
            idea_id = %record.id,
            title = %payload.title,
            stage = %IntakeStage::Enriched,
            "idea enriched"
        );
        Ok(IntakeOutcome::Enriched {
            record,
            payload,
            persisted: true,
        })
    }
}

fn deadline_after(budget: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(budget)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
