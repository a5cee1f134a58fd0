//! Command dispatch — thin plumbing between the Telegram channel and
//! the save pipeline.
//!
//! The bot owns authorization and command parsing; all branching logic
//! around saving lives in `pipeline`.

use std::sync::Arc;

use chrono::Local;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::channels::{TelegramChannel, TelegramMessage};
use crate::config::Config;
use crate::pipeline::SavePipeline;
use crate::pipeline::types::{IncomingNote, SummaryMode};
use crate::stats;

/// A parsed command. Arguments are whitespace-collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// `/s` — save with Brief enrichment. `None` when no text followed.
    Save(Option<String>),
    /// `/a` — save with Article enrichment. `None` when no text followed.
    Article(Option<String>),
    Stats,
    /// A slash command we don't know.
    Unknown,
    /// Ordinary text — logged, never forwarded.
    Plain,
}

/// Parse one incoming message text into a command.
pub fn parse_command(text: &str) -> Command {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return Command::Plain;
    }

    let mut words = trimmed.split_whitespace();
    let command = words.next().unwrap_or_default();
    // Group chats address commands as "/s@botname".
    let command = command.split('@').next().unwrap_or(command);
    let rest: Vec<&str> = words.collect();
    let args = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    match command {
        "/help" => Command::Help,
        "/s" => Command::Save(args),
        "/a" => Command::Article(args),
        "/stats" => Command::Stats,
        _ => Command::Unknown,
    }
}

/// The bot: one Telegram channel, one save pipeline.
pub struct Bot {
    config: Arc<Config>,
    channel: TelegramChannel,
    pipeline: SavePipeline,
    origin_host: String,
}

impl Bot {
    pub fn new(
        config: Arc<Config>,
        channel: TelegramChannel,
        pipeline: SavePipeline,
        origin_host: String,
    ) -> Self {
        Self {
            config,
            channel,
            pipeline,
            origin_host,
        }
    }

    /// Poll updates forever, dispatching each message.
    pub async fn run(&self) {
        let mut updates = self.channel.start();

        while let Some(message) = updates.next().await {
            if !self.is_authorized(&message) {
                warn!(
                    user_id = message.user_id,
                    chat_id = message.chat_id,
                    "Ignoring message from unauthorized user/chat"
                );
                continue;
            }

            let command = parse_command(&message.text);

            // Saves can take two network round-trips; show typing meanwhile.
            if matches!(
                command,
                Command::Save(Some(_)) | Command::Article(Some(_))
            ) {
                self.channel.send_typing(message.chat_id).await;
            }

            if let Some(reply) = self.dispatch(&message, command).await {
                if let Err(e) = self.channel.send_message(message.chat_id, &reply).await {
                    tracing::error!(error = %e, "Failed to send reply");
                }
            }
        }
    }

    /// Both the user and the chat must be allowlisted. Empty lists deny
    /// everything.
    fn is_authorized(&self, message: &TelegramMessage) -> bool {
        let telegram = &self.config.telegram;
        telegram.allowed_user_ids.contains(&message.user_id)
            && telegram.allowed_chat_ids.contains(&message.chat_id)
    }

    /// Parse one message and produce its reply, if any.
    pub async fn handle(&self, message: &TelegramMessage) -> Option<String> {
        self.dispatch(message, parse_command(&message.text)).await
    }

    async fn dispatch(&self, message: &TelegramMessage, command: Command) -> Option<String> {
        match command {
            Command::Help => Some(self.config.replies.help_text.clone()),
            Command::Stats => Some(format!("```\n{}\n```", stats::system_stats().await)),
            Command::Save(args) => Some(self.save(message, args, SummaryMode::Brief).await),
            Command::Article(args) => Some(self.save(message, args, SummaryMode::Article).await),
            Command::Unknown => Some(self.config.replies.general_help.clone()),
            Command::Plain => {
                // Receipt is logged; content only at DEBUG.
                info!(sender = %message.sender_name, "Received message");
                if self.config.debug {
                    debug!(content = %message.text, "Message content");
                }
                None
            }
        }
    }

    async fn save(
        &self,
        message: &TelegramMessage,
        args: Option<String>,
        mode: SummaryMode,
    ) -> String {
        // No trailing text: the pipeline never starts.
        let Some(raw_text) = args else {
            return self.config.replies.missing_content.clone();
        };

        info!(sender = %message.sender_name, ?mode, "Save command");

        let note = IncomingNote {
            raw_text,
            sender_name: message.sender_name.clone(),
            origin_host: self.origin_host.clone(),
            received_at: Local::now(),
        };
        self.pipeline.run(note, mode).await
    }
}
