// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude provider.
//!
//! Implements [`ProviderAdapter`] over the non-streaming Messages API. The
//! provider is domain-agnostic: prompts arrive fully built.

pub mod client;
pub mod types;

use async_trait::async_trait;
use ideabox_config::IdeaboxConfig;
use ideabox_core::{
    AdapterType, HealthStatus, IdeaboxError, PluginAdapter, ProviderAdapter, ProviderRequest,
    ProviderResponse,
};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Anthropic-backed [`ProviderAdapter`].
///
/// API key resolution order: `anthropic.api_key`, then `ANTHROPIC_API_KEY`.
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    pub fn new(config: &IdeaboxConfig) -> Result<Self, IdeaboxError> {
        let api_key = resolve_api_key(config.anthropic.api_key.as_deref())?;
        let client = AnthropicClient::new(
            &api_key,
            &config.anthropic.api_version,
            config.anthropic.default_model.clone(),
        )?;
        info!(
            model = config.anthropic.default_model,
            "Anthropic provider initialized"
        );
        Ok(Self { client })
    }

    pub fn with_client(client: AnthropicClient) -> Self {
        Self { client }
    }

    fn to_message_request(&self, request: ProviderRequest) -> MessageRequest {
        MessageRequest {
            model: self.client.default_model().to_string(),
            messages: vec![ApiMessage::user(request.prompt)],
            system: request.system_prompt,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    /// No API call; health checks should not spend tokens.
    async fn health_check(&self) -> Result<HealthStatus, IdeaboxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), IdeaboxError> {
        debug!("Anthropic provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, IdeaboxError> {
        let api_request = self.to_message_request(request);
        let response = self.client.complete_message(&api_request).await?;
        debug!(
            id = %response.id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion finished"
        );
        Ok(ProviderResponse {
            content: response.text(),
            model: response.model,
            stop_reason: response.stop_reason,
        })
    }
}

fn resolve_api_key(config_key: Option<&str>) -> Result<String, IdeaboxError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            IdeaboxError::Config(
                "Anthropic API key not found. Set anthropic.api_key in config or the ANTHROPIC_API_KEY environment variable.".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn config_key_wins() {
        assert_eq!(resolve_api_key(Some("sk-test-123")).unwrap(), "sk-test-123");
    }

    #[test]
    fn empty_config_key_is_not_used() {
        // Falls through to the environment, which may or may not be set.
        if let Ok(key) = resolve_api_key(Some("")) {
            assert!(!key.is_empty());
        }
    }

    #[tokio::test]
    async fn complete_maps_request_and_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-test",
                "system": "You are an analyst",
                "max_tokens": 2000,
                "messages": [{"role": "user", "content": "analyze this"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "content": [{"type": "text", "text": "{\"ok\":true}"}],
                "model": "claude-test",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 1, "output_tokens": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AnthropicClient::new("k", "2023-06-01", "claude-test".into())
            .unwrap()
            .with_base_url(server.uri());
        let provider = AnthropicProvider::with_client(client);

        let response = provider
            .complete(ProviderRequest {
                system_prompt: Some("You are an analyst".into()),
                prompt: "analyze this".into(),
                max_tokens: 2000,
            })
            .await
            .unwrap();
        assert_eq!(response.content, "{\"ok\":true}");
        assert_eq!(response.model, "claude-test");
        assert_eq!(provider.name(), "anthropic");
    }
}
