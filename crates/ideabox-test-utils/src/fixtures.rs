// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned submissions and model answers.

use ideabox_core::{
    Category, Complexity, EnrichedPayload, IdeaId, Origin, Priority, Submission, Submitter,
};

pub fn submission(submitter_id: i64, text: &str) -> Submission {
    Submission {
        text: text.to_string(),
        submitter: Submitter {
            id: submitter_id,
            username: Some(format!("user{submitter_id}")),
            first_name: "Tester".to_string(),
        },
        origin: Origin {
            chat_id: -1001,
            message_id: submitter_id * 100,
        },
    }
}

/// A feature / medium / small payload with the given title.
pub fn sample_payload(title: &str) -> EnrichedPayload {
    EnrichedPayload {
        title: title.to_string(),
        summary: "Adds a user-visible toggle.".to_string(),
        detailed_description: "A settings switch that changes the colour theme.".to_string(),
        category: Category::Feature,
        priority: Priority::Medium,
        complexity: Complexity::Small,
        affected_components: vec!["web-ui".to_string(), "settings".to_string()],
        user_story: "As a user, I want a dark theme, so that I can read at night".to_string(),
        acceptance_criteria: vec![
            "Toggle is visible in settings".to_string(),
            "Choice survives reload".to_string(),
        ],
        technical_notes: Some("Use CSS variables.".to_string()),
        related_features: Vec::new(),
        potential_risks: vec!["Low contrast in charts".to_string()],
    }
}

/// [`sample_payload`] as the JSON a model would return.
pub fn sample_payload_json(title: &str) -> String {
    serde_json::json!({
        "title": title,
        "summary": "Adds a user-visible toggle.",
        "detailed_description": "A settings switch that changes the colour theme.",
        "category": "feature",
        "priority": "medium",
        "complexity": "small",
        "affected_components": ["web-ui", "settings"],
        "user_story": "As a user, I want a dark theme, so that I can read at night",
        "acceptance_criteria": ["Toggle is visible in settings", "Choice survives reload"],
        "technical_notes": "Use CSS variables.",
        "potential_risks": ["Low contrast in charts"]
    })
    .to_string()
}

pub fn unique_verdict() -> String {
    r#"{"is_duplicate": false}"#.to_string()
}

pub fn duplicate_verdict(similar_id: IdeaId, reason: &str) -> String {
    serde_json::json!({
        "is_duplicate": true,
        "similar_idea_id": similar_id.0,
        "reason": reason,
    })
    .to_string()
}
