// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command parsing, chat filtering and outcome-to-reply mapping.
//!
//! Everything here is independent of the Bot API so it can be tested
//! without a network.

use std::collections::HashSet;
use std::sync::Arc;

use ideabox_config::model::TelegramConfig;
use ideabox_core::{Origin, Submission, Submitter};
use ideabox_intake::{IntakeError, IntakeOutcome, IntakePipeline};
use teloxide::types::Message;
use tracing::{error, info};

use crate::format::{self, Reply};

/// A recognized bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/idea <text>`, with the trimmed argument text.
    Idea(&'a str),
    /// `/start` or `/help`.
    Help,
}

/// Parses `/idea`, `/start` and `/help`, with or without an `@botname` suffix.
///
/// Returns `None` for plain messages and unknown commands.
pub fn parse_command(text: &str) -> Option<Command<'_>> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.find(char::is_whitespace) {
        Some(pos) => (&rest[..pos], rest[pos..].trim()),
        None => (rest, ""),
    };
    let name = head.split_once('@').map_or(head, |(name, _)| name);

    match name {
        "idea" => Some(Command::Idea(args)),
        "start" | "help" => Some(Command::Help),
        _ => None,
    }
}

/// Builds a submission from an incoming message.
///
/// Messages without a sender (channel posts) yield `None`, as do user ids
/// outside the `i64` range.
pub fn to_submission(msg: &Message, text: &str) -> Option<Submission> {
    let user = msg.from.as_ref()?;
    let id = i64::try_from(user.id.0).ok()?;
    Some(Submission {
        text: text.to_string(),
        submitter: Submitter {
            id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
        },
        origin: Origin {
            chat_id: msg.chat.id.0,
            message_id: i64::from(msg.id.0),
        },
    })
}

/// Shared state for answering idea commands.
pub struct IdeaHandler {
    pipeline: Arc<IntakePipeline>,
    allowed_chats: HashSet<i64>,
    min_chars: usize,
    max_chars: usize,
    base_url: String,
}

impl IdeaHandler {
    pub fn new(config: &TelegramConfig, base_url: &str, pipeline: Arc<IntakePipeline>) -> Self {
        Self {
            pipeline,
            allowed_chats: config.allowed_chats.iter().copied().collect(),
            min_chars: config.min_idea_chars,
            max_chars: config.max_idea_chars,
            base_url: base_url.to_string(),
        }
    }

    /// An empty allow-list serves every chat.
    pub fn is_allowed_chat(&self, chat_id: i64) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }

    /// Checks idea text length in characters. `Err` carries the reply to send.
    pub fn check_text(&self, text: &str) -> Result<(), Reply> {
        if text.is_empty() {
            return Err(Reply::plain(format::USAGE));
        }
        let chars = text.chars().count();
        if chars < self.min_chars {
            return Err(format::too_short(self.min_chars));
        }
        if chars > self.max_chars {
            return Err(format::too_long(self.max_chars));
        }
        Ok(())
    }

    /// Runs the submission through the pipeline and renders the outcome.
    pub async fn respond_to_idea(&self, submission: Submission) -> Reply {
        let chat_id = submission.origin.chat_id;
        match self.pipeline.submit(submission).await {
            Ok(IntakeOutcome::Enriched {
                record,
                payload,
                persisted,
            }) => {
                info!(chat_id, idea_id = %record.id, "replying with enriched idea");
                format::enriched(record.id, &payload, persisted, &self.base_url)
            }
            Ok(IntakeOutcome::Unenriched { record }) => {
                info!(chat_id, idea_id = %record.id, "replying with unenriched idea");
                format::unenriched(&record, &self.base_url)
            }
            Err(IntakeError::Duplicate { similar_id, reason }) => {
                format::duplicate(similar_id, &reason, &self.base_url)
            }
            Err(IntakeError::RateLimited) => Reply::plain(format::RATE_LIMITED),
            Err(IntakeError::CreateFailed(e)) => {
                error!(chat_id, error = %e, "idea could not be saved");
                Reply::plain(format::SAVE_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideabox_core::IdeaId;
    use ideabox_test_utils::{
        FailPoint, MemoryStore, TestHarness, duplicate_verdict, sample_payload_json, submission,
    };

    fn telegram_config() -> TelegramConfig {
        TelegramConfig {
            bot_token: Some("test:token".into()),
            allowed_chats: vec![],
            min_idea_chars: 10,
            max_idea_chars: 2000,
        }
    }

    fn group_message(user_id: u64, username: Option<&str>, text: &str) -> Message {
        let mut from = serde_json::json!({
            "id": user_id,
            "is_bot": false,
            "first_name": "Test",
        });
        if let Some(name) = username {
            from["username"] = serde_json::json!(name);
        }
        let json = serde_json::json!({
            "message_id": 42,
            "date": 1700000000i64,
            "chat": {
                "id": -100123i64,
                "type": "supergroup",
                "title": "Ideas",
            },
            "from": from,
            "text": text,
        });
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    async fn handler_over(store: Arc<MemoryStore>, responses: Vec<String>) -> (IdeaHandler, TestHarness) {
        let harness = TestHarness::builder()
            .with_storage(store)
            .with_mock_responses(responses)
            .build()
            .await
            .unwrap();
        let handler = IdeaHandler::new(
            &telegram_config(),
            "http://localhost:8080",
            harness.pipeline.clone(),
        );
        (handler, harness)
    }

    #[test]
    fn parses_idea_command() {
        assert_eq!(
            parse_command("/idea  add dark mode "),
            Some(Command::Idea("add dark mode"))
        );
        assert_eq!(
            parse_command("/idea@ideabox_bot add dark mode"),
            Some(Command::Idea("add dark mode"))
        );
        assert_eq!(parse_command("/idea"), Some(Command::Idea("")));
    }

    #[test]
    fn parses_help_commands() {
        assert_eq!(parse_command("/start"), Some(Command::Help));
        assert_eq!(parse_command("/help@ideabox_bot"), Some(Command::Help));
    }

    #[test]
    fn ignores_other_messages() {
        assert_eq!(parse_command("idea without slash"), None);
        assert_eq!(parse_command("/ideas list"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn submission_maps_sender_and_origin() {
        let msg = group_message(777, Some("alice"), "/idea add dark mode");
        let sub = to_submission(&msg, "add dark mode").unwrap();
        assert_eq!(sub.text, "add dark mode");
        assert_eq!(sub.submitter.id, 777);
        assert_eq!(sub.submitter.display_name(), "alice");
        assert_eq!(sub.origin.chat_id, -100123);
        assert_eq!(sub.origin.message_id, 42);
    }

    #[test]
    fn out_of_range_user_id_is_ignored() {
        let msg = group_message(u64::MAX, None, "/idea add dark mode");
        assert!(to_submission(&msg, "add dark mode").is_none());
    }

    #[test]
    fn allow_list_filters_chats() {
        let mut config = telegram_config();
        config.allowed_chats = vec![-100123];
        let pipeline = Arc::new(IntakePipeline::new(
            Default::default(),
            Arc::new(ideabox_intake::RateLimiter::new(5, 50)),
            Arc::new(MemoryStore::new()),
            Arc::new(ideabox_test_utils::MockProvider::new()),
            "Analyze the idea.",
        ));
        let handler = IdeaHandler::new(&config, "http://localhost:8080", pipeline);
        assert!(handler.is_allowed_chat(-100123));
        assert!(!handler.is_allowed_chat(555));
    }

    #[tokio::test]
    async fn text_length_is_checked_in_characters() {
        let (handler, _harness) = handler_over(Arc::new(MemoryStore::new()), vec![]).await;
        assert_eq!(handler.check_text(""), Err(Reply::plain(format::USAGE)));
        assert_eq!(handler.check_text("too short"), Err(format::too_short(10)));
        // Ten Cyrillic letters are twenty bytes but only ten characters.
        assert!(handler.check_text("тёмнаятема").is_ok());
        let long = "x".repeat(2001);
        assert_eq!(handler.check_text(&long), Err(format::too_long(2000)));
        assert!(handler.check_text(&"x".repeat(2000)).is_ok());
    }

    #[tokio::test]
    async fn enriched_outcome_renders_analysis() {
        let store = Arc::new(MemoryStore::new());
        let (handler, _harness) =
            handler_over(store, vec![sample_payload_json("Dark mode")]).await;

        let reply = handler
            .respond_to_idea(submission(1, "add dark mode toggle"))
            .await;
        assert!(reply.markdown);
        assert!(reply.text.starts_with("*Dark mode*"));
        assert!(reply.text.contains("(http://localhost:8080/ideas/1)"));
    }

    #[tokio::test]
    async fn duplicate_outcome_links_existing_idea() {
        let store = Arc::new(MemoryStore::new());
        let (handler, _harness) = handler_over(
            store,
            vec![
                sample_payload_json("Dark mode"),
                duplicate_verdict(IdeaId(1), "same toggle"),
            ],
        )
        .await;

        handler.respond_to_idea(submission(1, "add dark mode toggle")).await;
        let reply = handler.respond_to_idea(submission(2, "dark theme please")).await;
        assert!(reply.text.starts_with("*A similar idea already exists"));
        assert!(reply.text.contains("[Idea \\#1]"));
    }

    #[tokio::test]
    async fn create_failure_renders_generic_error() {
        let store = Arc::new(MemoryStore::new());
        store.set_failure(FailPoint::Create, true);
        let (handler, _harness) = handler_over(store, vec![]).await;

        let reply = handler.respond_to_idea(submission(1, "add dark mode toggle")).await;
        assert_eq!(reply, Reply::plain(format::SAVE_FAILED));
    }

    #[tokio::test]
    async fn unenriched_outcome_echoes_raw_text() {
        let store = Arc::new(MemoryStore::new());
        let (handler, _harness) = handler_over(store, vec!["no json here".into()]).await;

        let reply = handler.respond_to_idea(submission(1, "make it faster!")).await;
        assert!(reply.text.contains("make it faster\\!"));
        assert!(reply.text.contains("automatic analysis unavailable"));
    }
}
