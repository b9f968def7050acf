// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::IdeaboxError;
use crate::types::{AdapterType, HealthStatus};

/// Identity and lifecycle shared by every adapter.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    async fn health_check(&self) -> Result<HealthStatus, IdeaboxError>;

    /// Releases held resources. Safe to call more than once.
    async fn shutdown(&self) -> Result<(), IdeaboxError>;
}
