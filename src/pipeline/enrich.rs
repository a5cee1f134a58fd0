//! Enricher — optional fetch stage, then the summarize stage.
//!
//! Two explicit sequential stages. The fetch stage runs at most once and
//! only for URLs; its failure is logged and swallowed (the raw URL stays
//! the working content). A summarizer failure of any kind degrades the
//! whole enrichment to plain formatting. Nothing here aborts the save.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::pipeline::types::{
    Classification, ContentFetcher, Enrichment, IncomingNote, SummaryMode, Summarizer,
};

/// Hard ceiling (in characters) on content handed to the summarizer,
/// regardless of whether it came from the user or a fetched page.
pub const MAX_CONTENT_LENGTH: usize = 2048;

/// Truncate to `MAX_CONTENT_LENGTH` characters, ellipsis-terminated.
///
/// Output never exceeds the ceiling; when truncation happens the result
/// is exactly the ceiling long and ends with `"..."`. Counts characters,
/// so multibyte input never splits a code point.
pub fn truncate_for_summary(text: &str) -> String {
    if text.chars().count() <= MAX_CONTENT_LENGTH {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_CONTENT_LENGTH - 3).collect();
    out.push_str("...");
    out
}

/// Runs the enrichment stage of the save pipeline.
pub struct Enricher {
    fetcher: Arc<dyn ContentFetcher>,
    summarizer: Arc<dyn Summarizer>,
}

impl Enricher {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self { fetcher, summarizer }
    }

    /// Enrich one note. Total: always returns an `Enrichment`.
    pub async fn enrich(
        &self,
        note: &IncomingNote,
        classification: Classification,
        mode: SummaryMode,
    ) -> Enrichment {
        if !classification.wants_enrichment() {
            debug!("Input neither URL nor long; skipping enrichment");
            return Enrichment::plain(note.raw_text.clone());
        }

        // Stage 1 (optional): fetch page content for URLs.
        let mut working_content = note.raw_text.clone();
        let mut already_fetched = false;
        if classification.is_url {
            let url = note.raw_text.trim();
            match self.fetcher.fetch(url).await {
                Ok(text) => {
                    info!(chars = text.chars().count(), "Fetched URL content");
                    working_content = text;
                    already_fetched = true;
                }
                Err(e) => {
                    // Keep the raw URL as working content and continue.
                    warn!(error = %e, "URL fetch failed; summarizing the URL itself");
                }
            }
        }

        // Stage 2 (mandatory): summarize, within the content ceiling.
        let prompt_input = truncate_for_summary(&working_content);
        match self
            .summarizer
            .summarize(&prompt_input, already_fetched, mode)
            .await
        {
            Ok(summary) => {
                info!(headline = %summary.headline, "Summary generated");
                let display_content = if classification.is_url {
                    let url = note.raw_text.trim();
                    format!("[{url}]({url})")
                } else {
                    note.raw_text.clone()
                };
                Enrichment {
                    used_ai: true,
                    headline: Some(summary.headline),
                    summary: Some(summary.body),
                    display_content,
                }
            }
            Err(e) => {
                // No retry. Plain formatting takes over.
                warn!(error = %e, "Summarizer failed; degrading to plain formatting");
                Enrichment::plain(note.raw_text.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Local;

    use super::*;
    use crate::error::EnrichError;
    use crate::pipeline::classify::classify;
    use crate::pipeline::types::Summary;

    struct FixedFetcher {
        result: Result<String, String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentFetcher for FixedFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, EnrichError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map_err(EnrichError::Fetch)
        }
    }

    struct RecordingSummarizer {
        result: Result<Summary, String>,
        seen_already_fetched: AtomicUsize,
        seen_input_len: AtomicUsize,
    }

    #[async_trait]
    impl Summarizer for RecordingSummarizer {
        async fn summarize(
            &self,
            content: &str,
            already_fetched: bool,
            _mode: SummaryMode,
        ) -> Result<Summary, EnrichError> {
            self.seen_already_fetched
                .store(usize::from(already_fetched), Ordering::SeqCst);
            self.seen_input_len
                .store(content.chars().count(), Ordering::SeqCst);
            self.result.clone().map_err(EnrichError::Summarize)
        }
    }

    fn note(text: &str) -> IncomingNote {
        IncomingNote {
            raw_text: text.to_string(),
            sender_name: "alice".to_string(),
            origin_host: "testhost".to_string(),
            received_at: Local::now(),
        }
    }

    fn enricher(
        fetch: Result<String, String>,
        summarize: Result<Summary, String>,
    ) -> (Enricher, Arc<FixedFetcher>, Arc<RecordingSummarizer>) {
        let fetcher = Arc::new(FixedFetcher {
            result: fetch,
            calls: AtomicUsize::new(0),
        });
        let summarizer = Arc::new(RecordingSummarizer {
            result: summarize,
            seen_already_fetched: AtomicUsize::new(99),
            seen_input_len: AtomicUsize::new(0),
        });
        (
            Enricher::new(fetcher.clone(), summarizer.clone()),
            fetcher,
            summarizer,
        )
    }

    fn ok_summary() -> Result<Summary, String> {
        Ok(Summary {
            headline: "Example Page".to_string(),
            body: "A page about examples.".to_string(),
        })
    }

    #[tokio::test]
    async fn short_plain_text_skips_enrichment_entirely() {
        let (enricher, fetcher, _) = enricher(Ok("unused".into()), ok_summary());
        let n = note("hello");
        let e = enricher.enrich(&n, classify(&n.raw_text), SummaryMode::Brief).await;
        assert!(!e.used_ai);
        assert_eq!(e.display_content, "hello");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn url_fetch_success_feeds_summarizer_with_flag() {
        let (enricher, fetcher, summarizer) =
            enricher(Ok("URL: x\nTitle: t\n\nContent:\nbody".into()), ok_summary());
        let n = note("https://example.com/page");
        let e = enricher.enrich(&n, classify(&n.raw_text), SummaryMode::Brief).await;
        assert!(e.used_ai);
        assert_eq!(e.headline.as_deref(), Some("Example Page"));
        assert_eq!(
            e.display_content,
            "[https://example.com/page](https://example.com/page)"
        );
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(summarizer.seen_already_fetched.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn url_fetch_failure_keeps_raw_url_and_clears_flag() {
        let (enricher, _, summarizer) = enricher(Err("timeout".into()), ok_summary());
        let n = note("https://example.com/page");
        let e = enricher.enrich(&n, classify(&n.raw_text), SummaryMode::Brief).await;
        // Fetch failure does not abort: summarizer still ran, on the URL.
        assert!(e.used_ai);
        assert_eq!(summarizer.seen_already_fetched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn summarizer_failure_degrades_to_plain() {
        let (enricher, _, _) = enricher(Ok("content".into()), Err("api down".into()));
        let n = note(&"a".repeat(200));
        let e = enricher.enrich(&n, classify(&n.raw_text), SummaryMode::Brief).await;
        assert!(!e.used_ai);
        assert!(e.headline.is_none());
        assert_eq!(e.display_content, "a".repeat(200));
    }

    #[tokio::test]
    async fn long_text_is_truncated_before_summarizing() {
        let (enricher, fetcher, summarizer) =
            enricher(Ok("unused".into()), ok_summary());
        let n = note(&"x".repeat(5000));
        let e = enricher.enrich(&n, classify(&n.raw_text), SummaryMode::Brief).await;
        assert!(e.used_ai);
        assert_eq!(summarizer.seen_input_len.load(Ordering::SeqCst), MAX_CONTENT_LENGTH);
        // Non-URL: fetch stage never ran.
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        // AI path shows the original raw text, not the truncation.
        assert_eq!(e.display_content.chars().count(), 5000);
    }

    #[test]
    fn truncate_is_a_hard_ceiling() {
        assert_eq!(truncate_for_summary("short"), "short");

        let exact = "a".repeat(MAX_CONTENT_LENGTH);
        assert_eq!(truncate_for_summary(&exact), exact);

        let over = "a".repeat(MAX_CONTENT_LENGTH + 1);
        let truncated = truncate_for_summary(&over);
        assert_eq!(truncated.chars().count(), MAX_CONTENT_LENGTH);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncate_never_splits_multibyte_chars() {
        let over = "é".repeat(MAX_CONTENT_LENGTH + 10);
        let truncated = truncate_for_summary(&over);
        assert_eq!(truncated.chars().count(), MAX_CONTENT_LENGTH);
        assert!(truncated.ends_with("..."));
    }
}
