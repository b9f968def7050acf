// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Ideabox intake service.
//!
//! Holds the error type, the idea domain model, and the adapter traits that
//! storage backends and language model providers implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::IdeaboxError;
pub use types::{
    AdapterType, Category, Complexity, DuplicateVerdict, EnrichedPayload, HealthStatus,
    IdeaFilter, IdeaId, IdeaRecord, IdeaStatus, IdeaSummary, Origin, Priority, ProviderRequest,
    ProviderResponse, Submission, Submitter,
};

pub use traits::{PluginAdapter, ProviderAdapter, StorageAdapter};
