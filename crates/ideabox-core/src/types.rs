// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the intake pipeline, storage, transports and the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Characters of raw text shown for a duplicate candidate that has no title.
pub const CANDIDATE_PREVIEW_CHARS: usize = 100;

/// Identifier of a persisted idea. Assigned by storage, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(pub i64);

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The person who sent a submission, as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submitter {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
}

impl Submitter {
    /// Username when the platform provides one, first name otherwise.
    pub fn display_name(&self) -> &str {
        match self.username.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.first_name,
        }
    }
}

/// Where a submission was sent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub chat_id: i64,
    pub message_id: i64,
}

/// A raw idea as received from a chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub text: String,
    pub submitter: Submitter,
    pub origin: Origin,
}

/// Moderation lifecycle of an idea.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    #[default]
    New,
    Reviewed,
    Accepted,
    Rejected,
    InProgress,
    Implemented,
}

impl IdeaStatus {
    /// Statuses that drop an idea out of the duplicate-candidate window.
    pub const TERMINAL: [IdeaStatus; 2] = [IdeaStatus::Rejected, IdeaStatus::Implemented];

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Reviewed => "Reviewed",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::InProgress => "In progress",
            Self::Implemented => "Implemented",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Feature,
    Improvement,
    Bug,
    Integration,
    Other,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Feature => "Feature",
            Self::Improvement => "Improvement",
            Self::Bug => "Bug",
            Self::Integration => "Integration",
            Self::Other => "Other",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

/// Rough implementation effort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Trivial,
    Small,
    Medium,
    Large,
    Epic,
}

impl Complexity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Trivial => "Trivial (< 1h)",
            Self::Small => "Small (1-4h)",
            Self::Medium => "Medium (1-3d)",
            Self::Large => "Large (1-2w)",
            Self::Epic => "Epic (> 2w)",
        }
    }
}

/// Structured analysis of an idea produced by the language model.
///
/// Attached at most once per record. A record without one is a valid
/// final state (enrichment failed or was never attempted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPayload {
    pub title: String,
    pub summary: String,
    pub detailed_description: String,
    pub category: Category,
    pub priority: Priority,
    pub complexity: Complexity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_components: Vec<String>,
    pub user_story: String,
    pub acceptance_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub potential_risks: Vec<String>,
}

/// A persisted idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaRecord {
    pub id: IdeaId,
    pub submitter: Submitter,
    pub origin: Origin,
    pub raw_text: String,
    pub status: IdeaStatus,
    pub enrichment: Option<EnrichedPayload>,
    pub admin_notes: Option<String>,
    /// RFC 3339, UTC.
    pub created_at: String,
    /// RFC 3339, UTC.
    pub updated_at: String,
}

impl IdeaRecord {
    pub fn title(&self) -> Option<&str> {
        self.enrichment.as_ref().map(|p| p.title.as_str())
    }

    pub fn summary(&self) -> IdeaSummary {
        IdeaSummary {
            id: self.id,
            title: self.title().map(str::to_string),
            raw_text: self.raw_text.clone(),
        }
    }
}

/// Projection of a record used as a duplicate candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaSummary {
    pub id: IdeaId,
    pub title: Option<String>,
    pub raw_text: String,
}

impl IdeaSummary {
    /// Title, or a truncated preview of the raw text when untitled.
    pub fn preview(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => {
                if self.raw_text.chars().count() > CANDIDATE_PREVIEW_CHARS {
                    let head: String = self.raw_text.chars().take(CANDIDATE_PREVIEW_CHARS).collect();
                    format!("{head}...")
                } else {
                    self.raw_text.clone()
                }
            }
        }
    }
}

/// Outcome of comparing a submission against recent ideas. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateVerdict {
    Unique,
    Duplicate { similar_id: IdeaId, reason: String },
}

impl DuplicateVerdict {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Filter for moderation listings. Empty vectors match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaFilter {
    #[serde(default)]
    pub statuses: Vec<IdeaStatus>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub priorities: Vec<Priority>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Single-shot completion request sent to a language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Completion returned by a language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    /// Concatenated text content. May be empty.
    pub content: String,
    pub model: String,
    pub stop_reason: Option<String>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
}
