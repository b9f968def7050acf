// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`StorageAdapter`] with switchable failures.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;

use ideabox_core::{
    AdapterType, EnrichedPayload, HealthStatus, IdeaFilter, IdeaId, IdeaRecord, IdeaStatus,
    IdeaSummary, IdeaboxError, PluginAdapter, StorageAdapter, Submission,
};

/// Operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    ListSummaries,
    Create,
    Attach,
    Get,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    records: Vec<IdeaRecord>,
}

/// Records kept in insertion order behind a mutex.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    fail_attach: AtomicBool,
    fail_get: AtomicBool,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn injected(op: &str) -> IdeaboxError {
    IdeaboxError::Storage {
        source: format!("injected {op} failure").into(),
    }
}

fn matches(filter: &IdeaFilter, record: &IdeaRecord) -> bool {
    let payload = record.enrichment.as_ref();
    (filter.statuses.is_empty() || filter.statuses.contains(&record.status))
        && (filter.categories.is_empty()
            || payload.is_some_and(|p| filter.categories.contains(&p.category)))
        && (filter.priorities.is_empty()
            || payload.is_some_and(|p| filter.priorities.contains(&p.priority)))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failure(&self, point: FailPoint, fail: bool) {
        self.flag(point).store(fail, Ordering::SeqCst);
    }

    fn flag(&self, point: FailPoint) -> &AtomicBool {
        match point {
            FailPoint::ListSummaries => &self.fail_list,
            FailPoint::Create => &self.fail_create,
            FailPoint::Attach => &self.fail_attach,
            FailPoint::Get => &self.fail_get,
        }
    }

    fn failing(&self, point: FailPoint) -> bool {
        self.flag(point).load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of every record, oldest first.
    pub async fn records(&self) -> Vec<IdeaRecord> {
        self.inner.lock().await.records.clone()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, IdeaboxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), IdeaboxError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStore {
    async fn initialize(&self) -> Result<(), IdeaboxError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), IdeaboxError> {
        Ok(())
    }

    async fn create_record(&self, submission: &Submission) -> Result<IdeaRecord, IdeaboxError> {
        if self.failing(FailPoint::Create) {
            return Err(injected("create"));
        }
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let ts = now();
        let record = IdeaRecord {
            id: IdeaId(inner.next_id),
            submitter: submission.submitter.clone(),
            origin: submission.origin,
            raw_text: submission.text.clone(),
            status: IdeaStatus::New,
            enrichment: None,
            admin_notes: None,
            created_at: ts.clone(),
            updated_at: ts,
        };
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn get_record(&self, id: IdeaId) -> Result<Option<IdeaRecord>, IdeaboxError> {
        if self.failing(FailPoint::Get) {
            return Err(injected("get"));
        }
        let inner = self.inner.lock().await;
        Ok(inner.records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_active_summaries(&self, limit: usize) -> Result<Vec<IdeaSummary>, IdeaboxError> {
        if self.failing(FailPoint::ListSummaries) {
            return Err(injected("list"));
        }
        let inner = self.inner.lock().await;
        Ok(inner
            .records
            .iter()
            .rev()
            .filter(|r| !r.status.is_terminal())
            .take(limit)
            .map(IdeaRecord::summary)
            .collect())
    }

    async fn attach_enrichment(
        &self,
        id: IdeaId,
        payload: &EnrichedPayload,
    ) -> Result<(), IdeaboxError> {
        if self.failing(FailPoint::Attach) {
            return Err(injected("attach"));
        }
        let mut inner = self.inner.lock().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| IdeaboxError::NotFound {
                entity: "idea",
                id: id.to_string(),
            })?;
        record.enrichment = Some(payload.clone());
        record.updated_at = now();
        Ok(())
    }

    async fn list_records(&self, filter: &IdeaFilter) -> Result<Vec<IdeaRecord>, IdeaboxError> {
        let inner = self.inner.lock().await;
        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(inner
            .records
            .iter()
            .rev()
            .filter(|r| matches(filter, r))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_records(&self, filter: &IdeaFilter) -> Result<u64, IdeaboxError> {
        let inner = self.inner.lock().await;
        Ok(inner.records.iter().filter(|r| matches(filter, r)).count() as u64)
    }

    async fn update_status(&self, id: IdeaId, status: IdeaStatus) -> Result<bool, IdeaboxError> {
        let mut inner = self.inner.lock().await;
        Ok(match inner.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.status = status;
                record.updated_at = now();
                true
            }
            None => false,
        })
    }

    async fn update_notes(&self, id: IdeaId, notes: &str) -> Result<bool, IdeaboxError> {
        let mut inner = self.inner.lock().await;
        Ok(match inner.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.admin_notes = Some(notes.to_string());
                record.updated_at = now();
                true
            }
            None => false,
        })
    }

    async fn delete_record(&self, id: IdeaId) -> Result<bool, IdeaboxError> {
        let mut inner = self.inner.lock().await;
        let before = inner.records.len();
        inner.records.retain(|r| r.id != id);
        Ok(inner.records.len() < before)
    }
}
