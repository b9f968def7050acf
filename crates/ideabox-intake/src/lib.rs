// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The idea intake core.
//!
//! [`IntakePipeline`] runs each submission through [`RateLimiter`],
//! [`DuplicateDetector`], record creation, [`Enricher`] and the enrichment
//! write-back. Storage and the language model are reached only through the
//! adapter traits in `ideabox-core`.

pub mod duplicate;
pub mod enrich;
pub mod pipeline;
pub mod prompt;
pub mod rate_limit;

pub use duplicate::DuplicateDetector;
pub use enrich::Enricher;
pub use pipeline::{IntakeError, IntakeOutcome, IntakePipeline, IntakeSettings, IntakeStage};
pub use prompt::load_instruction_template;
pub use rate_limit::RateLimiter;
