// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat replies for each intake outcome.

use std::fmt::Write;

use ideabox_core::{EnrichedPayload, IdeaId, IdeaRecord};

use crate::markdown::{escape, escape_code, escape_link_url, strip_markdown};

pub const PLACEHOLDER: &str = "Analyzing your idea...";
pub const RATE_LIMITED: &str = "Too many ideas in the last hour. Please try again later.";
pub const SAVE_FAILED: &str = "Something went wrong while saving your idea. Please try again later.";
pub const USAGE: &str = "Please add the idea text after the command.\n\n\
                         Example: /idea add a dark theme to the console";

/// Split threshold below Telegram's 4096-character message limit, leaving
/// room for escaping overhead.
pub const SPLIT_THRESHOLD: usize = 3800;

/// A message body and whether it is MarkdownV2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
        }
    }

    /// The body as plain text, for the fallback when entities fail to parse.
    pub fn plain_text(&self) -> String {
        if self.markdown {
            strip_markdown(&self.text)
        } else {
            self.text.clone()
        }
    }

    /// Splits the body into parts that fit in one Telegram message each.
    pub fn split(&self) -> Vec<Reply> {
        let mut parts = Vec::new();
        let mut rest = self.text.as_str();
        loop {
            let (head, tail) = split_at_paragraph_boundary(rest, SPLIT_THRESHOLD);
            parts.push(Self {
                text: head.to_string(),
                markdown: self.markdown,
            });
            if tail.is_empty() {
                return parts;
            }
            rest = tail;
        }
    }
}

/// Splits `text` after at most `max_chars` characters, preferring a blank
/// line, then a newline, then a space.
pub fn split_at_paragraph_boundary(text: &str, max_chars: usize) -> (&str, &str) {
    let Some((limit, _)) = text.char_indices().nth(max_chars) else {
        return (text, "");
    };
    let region = &text[..limit];

    if let Some(pos) = region.rfind("\n\n").filter(|&pos| pos > 0) {
        return (&text[..pos], text[pos + 2..].trim_start());
    }
    if let Some(pos) = region.rfind('\n').filter(|&pos| pos > 0) {
        return (&text[..pos], text[pos + 1..].trim_start());
    }
    if let Some(pos) = region.rfind(' ').filter(|&pos| pos > 0) {
        return (&text[..pos], &text[pos + 1..]);
    }
    (region, &text[limit..])
}

pub fn idea_url(base_url: &str, id: IdeaId) -> String {
    format!("{}/ideas/{id}", base_url.trim_end_matches('/'))
}

fn idea_link(base_url: &str, id: IdeaId) -> String {
    format!(
        "[Idea \\#{id}]({})",
        escape_link_url(&idea_url(base_url, id))
    )
}

pub fn too_short(min_chars: usize) -> Reply {
    Reply::plain(format!(
        "The idea is too short. Describe it in more detail (at least {min_chars} characters)."
    ))
}

pub fn too_long(max_chars: usize) -> Reply {
    Reply::plain(format!(
        "The idea is too long (at most {max_chars} characters)."
    ))
}

pub fn help() -> Reply {
    Reply::markdown(
        "*Idea Bot*\n\n\
         Collects feature ideas and analyzes them with AI\\.\n\n\
         *Commands:*\n\
         /idea <text> \\- submit a new idea\n\
         /help \\- show this help\n\n\
         *Example:*\n\
         `/idea Add Slack integration for build notifications`\n\n\
         Your idea will be analyzed and saved for review\\.",
    )
}

pub fn duplicate(similar_id: IdeaId, reason: &str, base_url: &str) -> Reply {
    Reply::markdown(format!(
        "*A similar idea already exists\\!*\n\n{}\n\n{}",
        escape(reason),
        idea_link(base_url, similar_id)
    ))
}

/// The full analysis followed by a link to the stored idea.
pub fn enriched(id: IdeaId, payload: &EnrichedPayload, persisted: bool, base_url: &str) -> Reply {
    let mut msg = String::new();
    let _ = write!(msg, "*{}*\n\n{}\n\n", escape(&payload.title), escape(&payload.summary));
    let _ = writeln!(msg, "Category: `{}`", payload.category.label());
    let _ = writeln!(msg, "Priority: `{}`", payload.priority.label());
    let _ = writeln!(msg, "Complexity: `{}`", escape_code(payload.complexity.label()));

    if !payload.affected_components.is_empty() {
        let components: Vec<String> = payload
            .affected_components
            .iter()
            .map(|c| format!("`{}`", escape_code(c)))
            .collect();
        let _ = writeln!(msg, "Components: {}", components.join(", "));
    }

    let _ = write!(msg, "\n*User story:*\n{}\n", escape(&payload.user_story));
    push_list(&mut msg, "Acceptance criteria", &payload.acceptance_criteria);

    if let Some(notes) = payload.technical_notes.as_deref().filter(|n| !n.is_empty()) {
        let _ = write!(msg, "\n*Technical notes:*\n{}\n", escape(notes));
    }
    push_list(&mut msg, "Risks", &payload.potential_risks);

    let _ = write!(msg, "\n{} saved", idea_link(base_url, id));
    if !persisted {
        msg.push_str("\n_\\(the analysis could not be stored\\)_");
    }
    Reply::markdown(msg)
}

fn push_list(msg: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(msg, "\n*{heading}:*\n");
    for item in items {
        let _ = writeln!(msg, "• {}", escape(item));
    }
}

/// Confirmation for an idea stored without analysis.
pub fn unenriched(record: &IdeaRecord, base_url: &str) -> Reply {
    Reply::markdown(format!(
        "{} saved\\!\n\n{}\n\n_\\(automatic analysis unavailable\\)_",
        idea_link(base_url, record.id),
        escape(&record.raw_text)
    ))
}
