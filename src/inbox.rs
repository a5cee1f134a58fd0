//! Inbox push capability — delivers rendered notes to the note service.
//!
//! Single attempt per payload. Delivery counts as successful only when
//! the service answers with a success status; transport errors, auth
//! errors and a missing token all surface as `ForwardError` with a
//! human-readable diagnostic.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::InboxConfig;
use crate::error::ForwardError;
use crate::pipeline::types::{ForwardPayload, InboxSink};

/// Inbox request timeout.
const PUSH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct ShorthandRequest<'a> {
    title: &'a str,
    content: &'a str,
}

/// SiYuan cloud-shorthand inbox client.
pub struct SiyuanInbox {
    config: InboxConfig,
    client: reqwest::Client,
}

impl SiyuanInbox {
    pub fn new(config: InboxConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(PUSH_TIMEOUT)
            .build()
            .expect("static client configuration");
        Self { config, client }
    }
}

#[async_trait]
impl InboxSink for SiyuanInbox {
    async fn push(&self, payload: &ForwardPayload) -> Result<(), ForwardError> {
        let Some(token) = self.config.token.as_ref() else {
            return Err(ForwardError::MissingCredential(
                "SIYUAN_TOKEN is not set".to_string(),
            ));
        };

        // Title may be logged; content is user data and stays out of logs.
        info!(title = %payload.title, "Pushing note to inbox");
        debug!(chars = payload.content.chars().count(), "Payload size");

        let response = self
            .client
            .post(&self.config.api_url)
            .header(
                "Authorization",
                format!("token {}", token.expose_secret().trim()),
            )
            .json(&ShorthandRequest {
                title: &payload.title,
                content: &payload.content,
            })
            .send()
            .await
            .map_err(|e| ForwardError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!("Note accepted by inbox");
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(ForwardError::Rejected(format!(
                "HTTP status {status}: {detail}"
            )))
        }
    }
}
