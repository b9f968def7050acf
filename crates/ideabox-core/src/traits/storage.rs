// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence seam for idea records.

use async_trait::async_trait;

use crate::error::IdeaboxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    EnrichedPayload, IdeaFilter, IdeaId, IdeaRecord, IdeaStatus, IdeaSummary, Submission,
};

/// Storage backend for idea records.
///
/// The intake pipeline uses the first four record operations; the
/// moderation gateway uses the rest.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Prepares the backend (migrations, connections).
    async fn initialize(&self) -> Result<(), IdeaboxError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), IdeaboxError>;

    /// Inserts a new record with status `new` and no enrichment.
    ///
    /// Must be atomic: on error nothing is persisted.
    async fn create_record(&self, submission: &Submission) -> Result<IdeaRecord, IdeaboxError>;

    async fn get_record(&self, id: IdeaId) -> Result<Option<IdeaRecord>, IdeaboxError>;

    /// Most recent records whose status is not terminal, newest first.
    async fn list_active_summaries(&self, limit: usize) -> Result<Vec<IdeaSummary>, IdeaboxError>;

    /// Stores the payload on an existing record. Last writer wins.
    async fn attach_enrichment(
        &self,
        id: IdeaId,
        payload: &EnrichedPayload,
    ) -> Result<(), IdeaboxError>;

    async fn list_records(&self, filter: &IdeaFilter) -> Result<Vec<IdeaRecord>, IdeaboxError>;

    /// Number of records matching the filter, ignoring limit and offset.
    async fn count_records(&self, filter: &IdeaFilter) -> Result<u64, IdeaboxError>;

    /// Returns false when no record has this id.
    async fn update_status(&self, id: IdeaId, status: IdeaStatus) -> Result<bool, IdeaboxError>;

    /// Returns false when no record has this id.
    async fn update_notes(&self, id: IdeaId, notes: &str) -> Result<bool, IdeaboxError>;

    /// Returns false when no record has this id.
    async fn delete_record(&self, id: IdeaId) -> Result<bool, IdeaboxError>;
}
