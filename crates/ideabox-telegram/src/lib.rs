// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for Ideabox.
//!
//! Long-polls the Bot API via teloxide, answers `/idea`, `/start` and `/help`
//! in allowed chats, and replaces an "analyzing" placeholder with the
//! rendered intake outcome.

pub mod format;
pub mod handler;
pub mod markdown;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ideabox_config::model::TelegramConfig;
use ideabox_core::{AdapterType, HealthStatus, IdeaboxError, PluginAdapter};
use ideabox_intake::IntakePipeline;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use teloxide::{ApiError, RequestError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::format::Reply;
use crate::handler::{Command, IdeaHandler, parse_command, to_submission};

/// How long in-flight handlers get to finish after shutdown by default.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(90);

/// Telegram chat transport feeding the intake pipeline.
pub struct TelegramChannel {
    bot: Bot,
    handler: Arc<IdeaHandler>,
    in_flight: TaskTracker,
    drain_timeout: Duration,
}

impl TelegramChannel {
    /// Creates the transport. Requires `config.bot_token` to be set.
    pub fn new(
        config: &TelegramConfig,
        base_url: &str,
        pipeline: Arc<IntakePipeline>,
    ) -> Result<Self, IdeaboxError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            IdeaboxError::Config("telegram.bot_token is required for the Telegram transport".into())
        })?;
        if token.is_empty() {
            return Err(IdeaboxError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            bot: Bot::new(token),
            handler: Arc::new(IdeaHandler::new(config, base_url, pipeline)),
            in_flight: TaskTracker::new(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        })
    }

    /// Sets how long [`run`](Self::run) waits for running handlers on shutdown.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Polls for updates until `shutdown` is cancelled.
    ///
    /// Each message is handled on its own tracked task so a slow model call
    /// never holds up other chats. After polling stops, running handlers get
    /// up to the drain timeout to deliver their replies.
    pub async fn run(&self, shutdown: CancellationToken) {
        let state = self.handler.clone();
        let tracker = self.in_flight.clone();
        let schema = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
            let state = state.clone();
            let tracker = tracker.clone();
            async move {
                tracker.spawn(async move {
                    if let Err(e) = handle_message(&bot, &msg, &state).await {
                        warn!(chat_id = msg.chat.id.0, error = %e, "failed to answer message");
                    }
                });
                respond(())
            }
        });

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), schema)
            .default_handler(|_| async {})
            .build();

        info!("starting Telegram long polling");
        tokio::select! {
            () = dispatcher.dispatch() => {}
            () = shutdown.cancelled() => {}
        }
        info!("Telegram long polling stopped");

        drain_handlers(&self.in_flight, self.drain_timeout).await;
    }
}

/// Closes `tracker` and waits up to `timeout` for its tasks.
///
/// Returns `false` if some handlers were still running at the deadline.
pub async fn drain_handlers(tracker: &TaskTracker, timeout: Duration) -> bool {
    tracker.close();
    if tracker.is_empty() {
        info!("no message handlers to drain");
        return true;
    }

    info!(count = tracker.len(), "waiting for message handlers to finish");
    match tokio::time::timeout(timeout, tracker.wait()).await {
        Ok(()) => {
            info!("message handlers drained");
            true
        }
        Err(_) => {
            warn!(
                still_running = tracker.len(),
                "drain timeout elapsed, abandoning message handlers"
            );
            false
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, IdeaboxError> {
        match self.bot.get_me().await {
            Ok(me) => {
                debug!(username = ?me.username, "Telegram bot reachable");
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), IdeaboxError> {
        debug!("Telegram transport shutting down");
        Ok(())
    }
}

async fn handle_message(
    bot: &Bot,
    msg: &Message,
    handler: &IdeaHandler,
) -> Result<(), RequestError> {
    let chat_id = msg.chat.id.0;
    if !handler.is_allowed_chat(chat_id) {
        debug!(chat_id, "ignoring message from chat outside the allow-list");
        return Ok(());
    }
    let Some(command) = msg.text().and_then(parse_command) else {
        return Ok(());
    };

    match command {
        Command::Help => {
            deliver(bot, msg, None, &format::help()).await?;
        }
        Command::Idea(text) => {
            if let Err(reply) = handler.check_text(text) {
                send_reply(bot, msg, &reply).await?;
                return Ok(());
            }
            let Some(submission) = to_submission(msg, text) else {
                debug!(chat_id, "ignoring idea without a usable sender");
                return Ok(());
            };

            // The idea is submitted even when the placeholder cannot be sent.
            let placeholder = match send_reply(bot, msg, &Reply::plain(format::PLACEHOLDER)).await
            {
                Ok(sent) => Some(sent),
                Err(e) => {
                    warn!(chat_id, error = %e, "failed to send placeholder, submitting anyway");
                    None
                }
            };
            let reply = handler.respond_to_idea(submission).await;
            deliver(bot, msg, placeholder.as_ref(), &reply).await?;
        }
    }
    Ok(())
}

/// Delivers `reply` in as many messages as its length needs. The first part
/// replaces `placeholder` when there is one; the rest answer `msg`.
async fn deliver(
    bot: &Bot,
    msg: &Message,
    placeholder: Option<&Message>,
    reply: &Reply,
) -> Result<(), RequestError> {
    let mut parts = reply.split().into_iter();
    if let Some(target) = placeholder
        && let Some(first) = parts.next()
    {
        edit_reply(bot, target, &first).await?;
    }
    for part in parts {
        send_reply(bot, msg, &part).await?;
    }
    Ok(())
}

/// Sends `reply` as an answer to `msg`, downgrading to plain text when
/// Telegram rejects the MarkdownV2 entities.
async fn send_reply(bot: &Bot, msg: &Message, reply: &Reply) -> Result<Message, RequestError> {
    if reply.markdown {
        match bot
            .send_message(msg.chat.id, &reply.text)
            .parse_mode(ParseMode::MarkdownV2)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await
        {
            Ok(sent) => return Ok(sent),
            Err(e) => warn!(error = %e, "MarkdownV2 send failed, sending as plain text"),
        }
    }
    bot.send_message(msg.chat.id, reply.plain_text())
        .reply_parameters(ReplyParameters::new(msg.id))
        .await
}

async fn edit_reply(bot: &Bot, target: &Message, reply: &Reply) -> Result<(), RequestError> {
    if reply.markdown {
        match bot
            .edit_message_text(target.chat.id, target.id, &reply.text)
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => return Ok(()),
            Err(e) => warn!(error = %e, "MarkdownV2 edit failed, retrying as plain text"),
        }
    }
    match bot
        .edit_message_text(target.chat.id, target.id, reply.plain_text())
        .await
    {
        Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e),
    }
}
