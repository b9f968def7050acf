// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic duplicate detection against recent ideas.

use std::sync::Arc;

use ideabox_core::{
    DuplicateVerdict, IdeaId, IdeaSummary, IdeaboxError, ProviderAdapter, ProviderRequest,
};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::debug;

use crate::prompt;

const DEFAULT_REASON: &str = "matches an existing idea";

#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    is_duplicate: bool,
    #[serde(default)]
    similar_idea_id: Option<i64>,
    #[serde(default)]
    reason: Option<String>,
}

/// Asks the language model whether a submission repeats a recent idea.
pub struct DuplicateDetector {
    provider: Arc<dyn ProviderAdapter>,
    max_tokens: u32,
}

impl DuplicateDetector {
    pub fn new(provider: Arc<dyn ProviderAdapter>, max_tokens: u32) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }

    /// Compares `new_text` with `candidates`.
    ///
    /// No candidates means no model call. An answer that cannot be
    /// understood, or that points at an idea outside `candidates`, is
    /// treated as unique. Transport failures and deadline expiry are errors.
    pub async fn check(
        &self,
        new_text: &str,
        candidates: &[IdeaSummary],
        deadline: Instant,
    ) -> Result<DuplicateVerdict, IdeaboxError> {
        if candidates.is_empty() {
            return Ok(DuplicateVerdict::Unique);
        }

        let request = ProviderRequest {
            system_prompt: None,
            prompt: prompt::duplicate_prompt(new_text, candidates),
            max_tokens: self.max_tokens,
        };
        let started = Instant::now();
        let response = tokio::time::timeout_at(deadline, self.provider.complete(request))
            .await
            .map_err(|_| IdeaboxError::Timeout {
                duration: started.elapsed(),
            })??;

        Ok(interpret(&response.content, candidates))
    }
}

fn interpret(content: &str, candidates: &[IdeaSummary]) -> DuplicateVerdict {
    let Some(json) = prompt::extract_json_object(content) else {
        debug!("duplicate check returned no JSON, treating as unique");
        return DuplicateVerdict::Unique;
    };
    let raw: RawVerdict = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "unparsable duplicate verdict, treating as unique");
            return DuplicateVerdict::Unique;
        }
    };
    if !raw.is_duplicate {
        return DuplicateVerdict::Unique;
    }

    let Some(similar_id) = raw.similar_idea_id.map(IdeaId) else {
        debug!("duplicate verdict without an idea id, treating as unique");
        return DuplicateVerdict::Unique;
    };
    if !candidates.iter().any(|c| c.id == similar_id) {
        debug!(%similar_id, "duplicate verdict names an unknown idea, treating as unique");
        return DuplicateVerdict::Unique;
    }

    let reason = raw
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REASON.to_string());
    DuplicateVerdict::Duplicate { similar_id, reason }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ideabox_test_utils::MockProvider;

    use super::*;

    fn candidates() -> Vec<IdeaSummary> {
        vec![IdeaSummary {
            id: IdeaId(3),
            title: Some("Dark mode".into()),
            raw_text: "add dark mode toggle".into(),
        }]
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn empty_window_skips_the_model() {
        let provider = Arc::new(MockProvider::new());
        let detector = DuplicateDetector::new(provider.clone(), 500);
        let verdict = detector.check("anything", &[], deadline()).await.unwrap();
        assert_eq!(verdict, DuplicateVerdict::Unique);
        assert_eq!(provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn positive_verdict_is_returned() {
        let provider = Arc::new(MockProvider::new());
        provider
            .push_text(r#"{"is_duplicate": true, "similar_idea_id": 3, "reason": "same toggle"}"#)
            .await;
        let detector = DuplicateDetector::new(provider.clone(), 500);
        let verdict = detector
            .check("dark theme switch", &candidates(), deadline())
            .await
            .unwrap();
        assert_eq!(
            verdict,
            DuplicateVerdict::Duplicate {
                similar_id: IdeaId(3),
                reason: "same toggle".into()
            }
        );

        let request = provider.requests().await.remove(0);
        assert_eq!(request.max_tokens, 500);
        assert!(request.prompt.contains("- ID 3: Dark mode"));
    }

    #[test]
    fn malformed_output_is_unique() {
        for content in [
            "",
            "I think so",
            "{not json}",
            r#"{"is_duplicate": "maybe"}"#,
            r#"{"is_duplicate": true}"#,
            r#"{"is_duplicate": true, "similar_idea_id": 999, "reason": "x"}"#,
            r#"{"is_duplicate": false, "similar_idea_id": 3}"#,
        ] {
            assert_eq!(
                interpret(content, &candidates()),
                DuplicateVerdict::Unique,
                "content: {content}"
            );
        }
    }

    #[test]
    fn fenced_answer_without_reason_gets_default() {
        let verdict = interpret(
            "```json\n{\"is_duplicate\": true, \"similar_idea_id\": 3}\n```",
            &candidates(),
        );
        assert_eq!(
            verdict,
            DuplicateVerdict::Duplicate {
                similar_id: IdeaId(3),
                reason: DEFAULT_REASON.into()
            }
        );
    }

    #[tokio::test]
    async fn provider_error_is_propagated() {
        let provider = Arc::new(MockProvider::new());
        provider.push_error("upstream down").await;
        let detector = DuplicateDetector::new(provider, 500);
        let err = detector
            .check("x", &candidates(), deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, IdeaboxError::Provider { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_is_a_timeout() {
        let provider = Arc::new(MockProvider::new());
        provider
            .push_delayed_text(Duration::from_secs(120), r#"{"is_duplicate": false}"#)
            .await;
        let detector = DuplicateDetector::new(provider, 500);
        let err = detector
            .check("x", &candidates(), Instant::now() + Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}
