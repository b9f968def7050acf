// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities: mock adapters, fixtures and an intake harness.
//!
//! - [`MockProvider`] replays scripted model answers
//! - [`MemoryStore`] is an in-memory store with injectable failures
//! - [`TestHarness`] wires a full [`IntakePipeline`](ideabox_intake::IntakePipeline)

pub mod fixtures;
pub mod harness;
pub mod memory_store;
pub mod mock_provider;

pub use fixtures::{
    duplicate_verdict, sample_payload, sample_payload_json, submission, unique_verdict,
};
pub use harness::TestHarness;
pub use memory_store::{FailPoint, MemoryStore};
pub use mock_provider::MockProvider;
