//! Shared types for the save pipeline.
//!
//! Collaborator calls return tagged results (`Result` with a domain error),
//! never `(bool, String)` pairs. The pipeline normalizes every failure into
//! a degraded-but-total outcome before anything user-visible happens.

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::{EnrichError, ForwardError};

// ── Inbound note ────────────────────────────────────────────────────

/// One user submission entering the save pipeline.
///
/// Created per command invocation, immutable, discarded once the
/// pipeline has produced its single notification.
#[derive(Debug, Clone)]
pub struct IncomingNote {
    /// Raw text after the command, whitespace-collapsed.
    pub raw_text: String,
    /// Display name of the sender (username or first name).
    pub sender_name: String,
    /// Hostname of the machine running the bot.
    pub origin_host: String,
    /// When the command was received.
    pub received_at: DateTime<Local>,
}

// ── Classification ──────────────────────────────────────────────────

/// Deterministic classification of the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_url: bool,
    pub is_long: bool,
}

impl Classification {
    /// Whether the enrichment stage runs at all.
    pub fn wants_enrichment(&self) -> bool {
        self.is_url || self.is_long
    }
}

// ── Enrichment ──────────────────────────────────────────────────────

/// A successful summarizer response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Short label, 2–5 words.
    pub headline: String,
    /// 1–3 sentences (Brief mode) or a short formatted article.
    pub body: String,
}

/// Outcome of the enrichment stage.
///
/// `used_ai == true` implies both `headline` and `summary` are present
/// and came from a successful summarizer call; `used_ai == false` means
/// the pipeline degraded (or enrichment was never triggered).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub used_ai: bool,
    pub headline: Option<String>,
    pub summary: Option<String>,
    /// What the templates render as the submitted content: the original
    /// raw text, or a markdown link when the input was a URL.
    pub display_content: String,
}

impl Enrichment {
    /// Untriggered or degraded enrichment: plain formatting ahead.
    pub fn plain(display_content: impl Into<String>) -> Self {
        Self {
            used_ai: false,
            headline: None,
            summary: None,
            display_content: display_content.into(),
        }
    }
}

/// Which summarizer prompt variant is in play. The pipeline itself is
/// agnostic; only the capability's prompt and length budget differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    /// `/s` — 2–5 word headline plus a 1–3 sentence summary.
    Brief,
    /// `/a` — headline plus a formatted article up to ~300 words.
    Article,
}

// ── Forwarding ──────────────────────────────────────────────────────

/// The rendered submission handed to the inbox capability.
/// Exactly one is produced per incoming note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPayload {
    /// Non-empty title.
    pub title: String,
    /// Markdown body.
    pub content: String,
}

/// A rendered note plus the label the notifier quotes back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNote {
    pub payload: ForwardPayload,
    /// Headline for AI-composite renders, "URL bookmark" for URL-plain,
    /// `None` for plain text.
    pub reply_label: Option<String>,
}

/// Result of the single delivery attempt. Never partially successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    Delivered,
    Failed { diagnostic: String },
}

impl ForwardOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

// ── Capability traits ───────────────────────────────────────────────

/// Fetches readable text for a URL.
///
/// Runs at most once per invocation; output is already shaped as
/// `URL: <url>\nTitle: <title>\n\nContent:\n<text>` and capped at the
/// summarizer's content ceiling.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, EnrichError>;
}

/// Produces a headline + summary for a chunk of text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// `already_fetched` marks content that came from a scraped page; it
    /// changes only the prompt framing, never pipeline control flow.
    async fn summarize(
        &self,
        content: &str,
        already_fetched: bool,
        mode: SummaryMode,
    ) -> Result<Summary, EnrichError>;
}

/// Pushes a rendered payload to the note-capture inbox.
#[async_trait]
pub trait InboxSink: Send + Sync {
    /// Single attempt; any transport/auth/config problem is an error.
    async fn push(&self, payload: &ForwardPayload) -> Result<(), ForwardError>;
}
