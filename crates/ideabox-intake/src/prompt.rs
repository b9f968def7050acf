// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt text sent to the language model.

use std::fmt::Write;

use ideabox_core::IdeaSummary;
use tracing::{info, warn};

/// Built-in analyst instructions, used when no template file is configured.
pub const DEFAULT_INSTRUCTIONS: &str = include_str!("../prompts/analyst.md");

/// JSON schema the enrichment response must follow.
pub const RESPONSE_SCHEMA: &str = include_str!("../prompts/response_schema.json");

/// Reads the operator's instruction template, falling back to the built-in one.
///
/// An unreadable or blank file is logged and ignored.
pub async fn load_instruction_template(path: Option<&str>) -> String {
    if let Some(path) = path {
        match tokio::fs::read_to_string(path).await {
            Ok(content) if !content.trim().is_empty() => {
                info!(path, "loaded instruction template from file");
                return content.trim().to_string();
            }
            Ok(_) => warn!(path, "instruction template file is empty, using default"),
            Err(e) => warn!(
                path,
                error = %e,
                "failed to read instruction template, using default"
            ),
        }
    }
    DEFAULT_INSTRUCTIONS.trim().to_string()
}

/// Instructions plus the schema the model must answer with.
pub fn enrichment_system_prompt(instructions: &str) -> String {
    format!("{instructions}\n\nExpected JSON schema:\n{RESPONSE_SCHEMA}")
}

pub fn enrichment_user_prompt(raw_text: &str, display_name: &str) -> String {
    format!(
        "User @{display_name} submitted an idea:\n\n\"{raw_text}\"\n\n\
         Analyze this idea and return a structured JSON according to the schema.\n\
         Do not use markdown formatting, return only clean JSON."
    )
}

pub fn duplicate_prompt(new_text: &str, candidates: &[IdeaSummary]) -> String {
    let mut listing = String::new();
    for candidate in candidates {
        let _ = writeln!(listing, "- ID {}: {}", candidate.id, candidate.preview());
    }

    format!(
        "Check whether the new idea duplicates, or is very similar to, one of the existing ideas.\n\n\
         New idea:\n\"{new_text}\"\n\n\
         Existing ideas:\n{listing}\n\
         Return a JSON object with:\n\
         - is_duplicate: true if the new idea means the same as, or is very close to, an existing one\n\
         - similar_idea_id: ID of the similar idea (only when is_duplicate is true)\n\
         - reason: a short explanation of why it is a duplicate, in the language of the new idea\n\n\
         Treat ideas as duplicates only when they describe the same functionality or the same improvement.\n\
         Ideas that merely belong to the same area but ask for different things are NOT duplicates.\n\n\
         Return ONLY JSON without markdown."
    )
}

/// Slice from the first `{` to the last `}`.
///
/// Models sometimes wrap JSON in code fences or a sentence of prose.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
