// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language model seam.

use async_trait::async_trait;

use crate::error::IdeaboxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// A domain-agnostic text completion backend.
///
/// Implementations know nothing about ideas; the intake crate builds the
/// prompts and interprets the returned text.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, IdeaboxError>;
}
