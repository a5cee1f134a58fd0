//! The save pipeline.
//!
//! Every `/s` and `/a` invocation flows through:
//! 1. `classify` — URL / length detection (pure)
//! 2. `Enricher` — optional fetch stage, then the summarize stage
//! 3. `format::render` — one of three templates
//! 4. `InboxSink::push` — single delivery attempt
//! 5. `notify::notification` — exactly one reply
//!
//! The pipeline is stateless across invocations and total: every
//! collaborator failure is normalized before it can escape, and every
//! invocation ends in exactly one notification.

pub mod classify;
pub mod enrich;
pub mod format;
pub mod notify;
pub mod types;

use std::sync::Arc;

use tracing::{error, info};

use crate::config::ReplyTexts;
use crate::pipeline::enrich::Enricher;
use crate::pipeline::types::{
    ContentFetcher, ForwardOutcome, IncomingNote, InboxSink, SummaryMode, Summarizer,
};

/// One configured save pipeline. Cheap to share; holds no per-invocation
/// state.
pub struct SavePipeline {
    enricher: Enricher,
    inbox: Arc<dyn InboxSink>,
    replies: ReplyTexts,
}

impl SavePipeline {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        summarizer: Arc<dyn Summarizer>,
        inbox: Arc<dyn InboxSink>,
        replies: ReplyTexts,
    ) -> Self {
        Self {
            enricher: Enricher::new(fetcher, summarizer),
            inbox,
            replies,
        }
    }

    /// Run one note through the full pipeline and return the reply to
    /// send back to the user. Infallible by construction: degraded and
    /// failed paths still produce their one notification.
    pub async fn run(&self, note: IncomingNote, mode: SummaryMode) -> String {
        let classification = classify::classify(&note.raw_text);
        info!(
            is_url = classification.is_url,
            is_long = classification.is_long,
            sender = %note.sender_name,
            "Processing save command"
        );

        let enrichment = self.enricher.enrich(&note, classification, mode).await;
        let rendered = format::render(&note, classification, &enrichment);

        let outcome = match self.inbox.push(&rendered.payload).await {
            Ok(()) => {
                info!(title = %rendered.payload.title, "Note forwarded to inbox");
                ForwardOutcome::Delivered
            }
            Err(e) => {
                error!(error = %e, "Failed to forward note to inbox");
                ForwardOutcome::Failed {
                    diagnostic: e.to_string(),
                }
            }
        };

        notify::notification(&self.replies, &outcome, rendered.reply_label.as_deref())
    }
}
