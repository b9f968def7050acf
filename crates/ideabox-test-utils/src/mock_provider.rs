// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted language model for deterministic tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ideabox_core::{
    AdapterType, HealthStatus, IdeaboxError, PluginAdapter, ProviderAdapter, ProviderRequest,
    ProviderResponse,
};

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Error(String),
    Delayed(Duration, String),
}

/// A provider that replays queued answers in FIFO order.
///
/// With an empty queue it answers `"mock response"`, which is neither a
/// duplicate verdict nor an enrichment. Every request is recorded.
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(
                responses.into_iter().map(Scripted::Text).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn push_text(&self, text: &str) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Text(text.to_string()));
    }

    /// Queues a provider error with this message.
    pub async fn push_error(&self, message: &str) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Error(message.to_string()));
    }

    /// Queues an answer that arrives after `delay` of tokio time.
    pub async fn push_delayed_text(&self, delay: Duration, text: &str) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Delayed(delay, text.to_string()));
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    fn respond(text: String) -> ProviderResponse {
        ProviderResponse {
            content: text,
            model: "mock-model".to_string(),
            stop_reason: Some("end_turn".to_string()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, IdeaboxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), IdeaboxError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, IdeaboxError> {
        self.requests.lock().await.push(request);
        let next = self.script.lock().await.pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(Self::respond(text)),
            Some(Scripted::Error(message)) => Err(IdeaboxError::provider(message)),
            Some(Scripted::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(Self::respond(text))
            }
            None => Ok(Self::respond("mock response".to_string())),
        }
    }
}
