// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MarkdownV2 escaping for Telegram Bot API.
//!
//! Idea text and model output are untrusted, so everything they contain is
//! escaped; formatting only ever comes from the reply templates.

/// Characters that must be escaped in MarkdownV2 outside code entities.
const SPECIAL_CHARS: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
    '!',
];

/// Markers removed when a MarkdownV2 reply is downgraded to plain text.
const FORMATTING_MARKERS: &[char] = &['*', '_', '`', '~'];

/// Escapes free text for MarkdownV2.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if SPECIAL_CHARS.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escapes text placed between backticks.
///
/// Inside code entities only the backtick and backslash are special.
pub fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '`' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escapes the URL part of an inline link, where `)` and `\` are special.
pub fn escape_link_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        if ch == ')' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Turns a MarkdownV2 message back into readable plain text.
///
/// Escaped characters are kept literally; unescaped formatting markers are
/// dropped. Used when Telegram refuses to parse the entities.
pub fn strip_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else if !FORMATTING_MARKERS.contains(&ch) {
            out.push(ch);
        }
    }
    out
}
