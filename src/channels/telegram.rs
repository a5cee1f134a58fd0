//! Telegram channel — long-polls the Bot API for updates.
//!
//! Thin transport: yields text messages as a stream and sends replies.
//! All command handling and pipeline logic lives in `bot`.

use std::pin::Pin;

use futures::Stream;
use secrecy::ExposeSecret;

use crate::config::TelegramConfig;
use crate::error::ChannelError;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Long-poll timeout passed to getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

/// One text message received from Telegram.
#[derive(Debug, Clone)]
pub struct TelegramMessage {
    pub chat_id: i64,
    pub user_id: i64,
    /// Username if set, otherwise the first name, otherwise "unknown".
    pub sender_name: String,
    pub text: String,
}

/// Stream of incoming messages.
pub type UpdateStream = Pin<Box<dyn Stream<Item = TelegramMessage> + Send>>;

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.config.bot_token.expose_secret()
        )
    }

    /// Start the long-poll loop and return the update stream.
    pub fn start(&self) -> UpdateStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let poll_url = self.api_url("getUpdates");
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message"],
                });

                let resp = match client.post(&poll_url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let status = resp.status();
                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                // A 409 (competing poller) or 401 (revoked token) parses
                // fine as JSON; without a pause here they would spin the
                // loop at network speed.
                let results = match extract_updates(status, &data) {
                    Ok(r) => r,
                    Err(reason) => {
                        tracing::warn!("Telegram poll rejected: {reason}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                for update in results {
                    if let Some(uid) = update.get("update_id").and_then(serde_json::Value::as_i64)
                    {
                        offset = uid + 1;
                    }

                    let Some(message) = parse_update(update) else {
                        continue;
                    };

                    if tx.send(message).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        }))
    }

    /// Send a text message, trying Markdown first with plain text fallback.
    /// Splits messages that exceed Telegram's 4096 char limit.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        for chunk in split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH) {
            self.send_message_chunk(chat_id, &chunk).await?;
        }
        Ok(())
    }

    async fn send_message_chunk(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        let markdown_body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let markdown_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&markdown_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if markdown_resp.status().is_success() {
            return Ok(());
        }

        let markdown_status = markdown_resp.status();
        tracing::warn!(
            status = ?markdown_status,
            "Telegram sendMessage with Markdown failed; retrying without parse_mode"
        );

        let plain_body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        let plain_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&plain_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if !plain_resp.status().is_success() {
            let plain_err = plain_resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "telegram".into(),
                reason: format!(
                    "sendMessage failed (markdown: {markdown_status}, plain: {plain_err})"
                ),
            });
        }

        Ok(())
    }

    /// Show the "typing" indicator while a save is in flight.
    pub async fn send_typing(&self, chat_id: i64) {
        let _ = self
            .client
            .post(self.api_url("sendChatAction"))
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "action": "typing",
            }))
            .send()
            .await;
    }

    /// Verify the bot token against getMe.
    pub async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }
}

/// Validate one getUpdates response and pull out its update list.
/// Non-2xx statuses and `"ok": false` bodies are errors, so the poll
/// loop backs off instead of retrying immediately.
fn extract_updates(
    status: reqwest::StatusCode,
    data: &serde_json::Value,
) -> Result<&[serde_json::Value], String> {
    let api_ok = data
        .get("ok")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);

    if !status.is_success() || !api_ok {
        let description = data
            .get("description")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("no description");
        return Err(format!("getUpdates returned {status}: {description}"));
    }

    data.get("result")
        .and_then(serde_json::Value::as_array)
        .map(|r| r.as_slice())
        .ok_or_else(|| "getUpdates response has no result array".to_string())
}

/// Extract a text message from one getUpdates entry.
fn parse_update(update: &serde_json::Value) -> Option<TelegramMessage> {
    let message = update.get("message")?;
    let text = message.get("text").and_then(serde_json::Value::as_str)?;

    let from = message.get("from");
    let user_id = from
        .and_then(|f| f.get("id"))
        .and_then(serde_json::Value::as_i64)?;
    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(serde_json::Value::as_i64)?;

    let username = from
        .and_then(|f| f.get("username"))
        .and_then(serde_json::Value::as_str);
    let first_name = from
        .and_then(|f| f.get("first_name"))
        .and_then(serde_json::Value::as_str);
    let sender_name = username.or(first_name).unwrap_or("unknown").to_string();

    Some(TelegramMessage {
        chat_id,
        user_id,
        sender_name,
        text: text.to_string(),
    })
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts on a char
/// boundary.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        // Byte offset of the (max_len + 1)-th char, if there is one.
        let Some((cut, _)) = remaining.char_indices().nth(max_len) else {
            chunks.push(remaining.to_string());
            break;
        };

        let window = &remaining[..cut];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&at| at > 0)
            .unwrap_or(cut);

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}
