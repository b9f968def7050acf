// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns raw idea text into an [`EnrichedPayload`] via the language model.

use std::sync::Arc;

use ideabox_core::{EnrichedPayload, IdeaboxError, ProviderAdapter, ProviderRequest};
use tokio::time::Instant;

use crate::prompt;

pub struct Enricher {
    provider: Arc<dyn ProviderAdapter>,
    system_prompt: String,
    max_tokens: u32,
}

impl Enricher {
    /// `instructions` is the analyst template; the response schema is appended.
    pub fn new(provider: Arc<dyn ProviderAdapter>, instructions: &str, max_tokens: u32) -> Self {
        Self {
            provider,
            system_prompt: prompt::enrichment_system_prompt(instructions),
            max_tokens,
        }
    }

    /// Empty output, undecodable JSON, an unknown enum label or a blank
    /// title are all errors. Nothing is retried here.
    pub async fn enrich(
        &self,
        raw_text: &str,
        display_name: &str,
        deadline: Instant,
    ) -> Result<EnrichedPayload, IdeaboxError> {
        let request = ProviderRequest {
            system_prompt: Some(self.system_prompt.clone()),
            prompt: prompt::enrichment_user_prompt(raw_text, display_name),
            max_tokens: self.max_tokens,
        };
        let started = Instant::now();
        let response = tokio::time::timeout_at(deadline, self.provider.complete(request))
            .await
            .map_err(|_| IdeaboxError::Timeout {
                duration: started.elapsed(),
            })??;

        parse_payload(&response.content)
    }
}

fn parse_payload(content: &str) -> Result<EnrichedPayload, IdeaboxError> {
    if content.trim().is_empty() {
        return Err(IdeaboxError::provider("empty response from language model"));
    }
    let json = prompt::extract_json_object(content)
        .ok_or_else(|| IdeaboxError::decode("enrichment response contains no JSON object"))?;
    let mut payload: EnrichedPayload = serde_json::from_str(json)
        .map_err(|e| IdeaboxError::decode(format!("invalid enrichment JSON: {e}")))?;

    payload.title = payload.title.trim().to_string();
    if payload.title.is_empty() {
        return Err(IdeaboxError::decode("enrichment has an empty title"));
    }
    Ok(payload)
}
