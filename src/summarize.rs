//! Summarizer capability — AI headline + summary generation.
//!
//! One chat-completions call in JSON-object mode. Two prompt variants:
//! Brief (short headline, 1–3 sentence summary) and Article (headline
//! plus a formatted article up to ~300 words). A missing API key is a
//! per-call failure, never a crash: the pipeline degrades.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::AiConfig;
use crate::error::EnrichError;
use crate::pipeline::types::{Summary, SummaryMode, Summarizer};

/// Default chat-completions endpoint.
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Summarizer request timeout.
const SUMMARIZE_TIMEOUT: Duration = Duration::from_secs(30);

const BRIEF_SYSTEM_PROMPT: &str = "You are a summarization assistant. Create concise \
    summaries that instantly reveal the relevant context when read.";

const ARTICLE_SYSTEM_PROMPT: &str = "You are a personal assistant tasked with writing down \
    given information into a concise article optimised for human readability and well \
    formatted, you can use markdown syntax, emojis and tools needed to format it well. \
    For lists use bulletpoints.";

/// OpenAI-backed summarizer.
pub struct OpenAiSummarizer {
    config: AiConfig,
    api_url: String,
    client: reqwest::Client,
}

impl OpenAiSummarizer {
    pub fn new(config: AiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SUMMARIZE_TIMEOUT)
            .build()
            .expect("static client configuration");
        Self {
            config,
            api_url: OPENAI_API_URL.to_string(),
            client,
        }
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Build the (system, user) prompt pair for one summarizer call.
fn build_prompts(content: &str, already_fetched: bool, mode: SummaryMode) -> (String, String) {
    let (system, shape) = match mode {
        SummaryMode::Brief => (
            BRIEF_SYSTEM_PROMPT,
            "Return in JSON like: {\"h\": \"headline, max 2 to 5 words\", \
             \"s\": \"summary, this is a summary telling what the given input is about, \
             1-3 sentences long.\"}",
        ),
        SummaryMode::Article => (
            ARTICLE_SYSTEM_PROMPT,
            "Return in JSON like: {\"h\": \"headline, max 2 to 5 words which let the user \
             at first glance understand what this article is about.\", \
             \"s\": \"Article max. 300 words.\"}",
        ),
    };

    let mut user = shape.to_string();
    if already_fetched {
        user.push_str(match mode {
            SummaryMode::Brief => {
                "\n\nThis is output from a scraped HTML page, try your best to tell \
                 what the content is about."
            }
            SummaryMode::Article => {
                "\n\nThis is output from a scraped HTML page, transform it into a \
                 well-structured article."
            }
        });
    }
    user.push_str("\n\nContent: ");
    user.push_str(content);

    (system.to_string(), user)
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// The JSON shape the model is asked for.
#[derive(Debug, Deserialize)]
struct SummaryJson {
    h: String,
    s: String,
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(
        &self,
        content: &str,
        already_fetched: bool,
        mode: SummaryMode,
    ) -> Result<Summary, EnrichError> {
        let Some(api_key) = self.config.api_key.as_ref() else {
            return Err(EnrichError::MissingCredential(
                "OPENAI_TOKEN is not set".to_string(),
            ));
        };

        let (system, user) = build_prompts(content, already_fetched, mode);
        info!(model = %self.config.model, already_fetched, "Requesting summary");

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EnrichError::Summarize(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EnrichError::Summarize(format!(
                "HTTP status {status}: {detail}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::InvalidResponse(e.to_string()))?;

        let raw = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| EnrichError::InvalidResponse("empty choices".to_string()))?;

        let parsed: SummaryJson = serde_json::from_str(raw)
            .map_err(|e| EnrichError::InvalidResponse(format!("bad summary JSON: {e}")))?;
        debug!(headline = %parsed.h, "Summary parsed");

        Ok(Summary {
            headline: parsed.h,
            body: parsed.s,
        })
    }
}
