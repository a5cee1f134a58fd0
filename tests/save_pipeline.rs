//! End-to-end save pipeline scenarios with mock capabilities.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Local;
use secrecy::SecretString;

use notegram::bot::Bot;
use notegram::channels::{TelegramChannel, TelegramMessage};
use notegram::config::{AiConfig, Config, InboxConfig, ReplyTexts, TelegramConfig};
use notegram::error::{EnrichError, ForwardError};
use notegram::pipeline::types::{
    ContentFetcher, ForwardPayload, IncomingNote, InboxSink, Summary, SummaryMode, Summarizer,
};
use notegram::pipeline::SavePipeline;

// ── Mock capabilities ───────────────────────────────────────────────

struct MockFetcher {
    result: Result<String, String>,
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, EnrichError> {
        self.result.clone().map_err(EnrichError::Fetch)
    }
}

struct MockSummarizer {
    result: Result<Summary, String>,
    calls: Mutex<u32>,
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(
        &self,
        _content: &str,
        _already_fetched: bool,
        _mode: SummaryMode,
    ) -> Result<Summary, EnrichError> {
        *self.calls.lock().unwrap() += 1;
        self.result.clone().map_err(EnrichError::Summarize)
    }
}

struct RecordingInbox {
    accept: bool,
    pushed: Mutex<Vec<ForwardPayload>>,
}

#[async_trait]
impl InboxSink for RecordingInbox {
    async fn push(&self, payload: &ForwardPayload) -> Result<(), ForwardError> {
        self.pushed.lock().unwrap().push(payload.clone());
        if self.accept {
            Ok(())
        } else {
            Err(ForwardError::Transport("connection refused".to_string()))
        }
    }
}

// ── Harness ─────────────────────────────────────────────────────────

struct Harness {
    pipeline: SavePipeline,
    summarizer: Arc<MockSummarizer>,
    inbox: Arc<RecordingInbox>,
}

fn harness(
    fetch: Result<String, String>,
    summarize: Result<Summary, String>,
    inbox_accepts: bool,
) -> Harness {
    let summarizer = Arc::new(MockSummarizer {
        result: summarize,
        calls: Mutex::new(0),
    });
    let inbox = Arc::new(RecordingInbox {
        accept: inbox_accepts,
        pushed: Mutex::new(Vec::new()),
    });
    let pipeline = SavePipeline::new(
        Arc::new(MockFetcher { result: fetch }),
        summarizer.clone(),
        inbox.clone(),
        ReplyTexts::default(),
    );
    Harness {
        pipeline,
        summarizer,
        inbox,
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

fn good_summary() -> Result<Summary, String> {
    Ok(Summary {
        headline: "Example Page".to_string(),
        body: "A page about examples.".to_string(),
    })
}

// ── Scenario A: short plain text ────────────────────────────────────

#[tokio::test]
async fn short_text_saves_without_enrichment() {
    let h = harness(Ok("unused".into()), good_summary(), true);

    let reply = h.pipeline.run(note("hello"), SummaryMode::Brief).await;

    assert_eq!(reply, "✔️ sent");
    assert_eq!(*h.summarizer.calls.lock().unwrap(), 0);

    let pushed = h.inbox.pushed.lock().unwrap();
    assert_eq!(pushed.len(), 1);
    assert!(pushed[0].title.starts_with("telegram "));
    assert!(pushed[0].content.starts_with("## input via telegram\n"));
    assert!(pushed[0].content.contains("```\nhello\n```"));
}

// ── Scenario B: URL with successful enrichment ──────────────────────

#[tokio::test]
async fn url_with_ai_uses_composite_template() {
    let h = harness(
        Ok("URL: https://example.com/page\nTitle: Example\n\nContent:\nbody".into()),
        good_summary(),
        true,
    );

    let reply = h
        .pipeline
        .run(note("https://example.com/page"), SummaryMode::Brief)
        .await;

    assert_eq!(reply, "✔️ sent as \"Example Page\"");

    let pushed = h.inbox.pushed.lock().unwrap();
    assert_eq!(pushed.len(), 1);
    let today = Local::now().format("%Y-%m-%d").to_string();
    assert_eq!(pushed[0].title, format!("{today} Example Page"));
    assert!(pushed[0].content.starts_with("## Example Page\n"));
    assert!(pushed[0]
        .content
        .contains("[https://example.com/page](https://example.com/page)"));
}

// ── Scenario C: long text, summarizer down ──────────────────────────

#[tokio::test]
async fn long_text_degrades_to_plain_template() {
    let h = harness(Ok("unused".into()), Err("api down".into()), true);

    let long = "a".repeat(200);
    let reply = h.pipeline.run(note(&long), SummaryMode::Brief).await;

    assert_eq!(reply, "✔️ sent");
    assert_eq!(*h.summarizer.calls.lock().unwrap(), 1);

    // Degrade law: a failed summarizer never leaves AI fragments behind.
    let pushed = h.inbox.pushed.lock().unwrap();
    assert!(pushed[0].title.starts_with("telegram "));
    assert!(pushed[0].content.starts_with("## input via telegram\n"));
}

#[tokio::test]
async fn url_degrades_to_bookmark_template() {
    let h = harness(Err("fetch timeout".into()), Err("no key".into()), true);

    let reply = h
        .pipeline
        .run(note("https://example.com/page"), SummaryMode::Brief)
        .await;

    assert_eq!(reply, "✔️ sent as \"URL bookmark\"");

    let pushed = h.inbox.pushed.lock().unwrap();
    assert_eq!(pushed[0].title, "URL: https://example.com/page");
    assert!(pushed[0].content.starts_with("## URL Bookmark\n"));
}

// ── Scenario D: forwarding fails ────────────────────────────────────

#[tokio::test]
async fn forward_failure_yields_fixed_reply() {
    // Enrichment succeeded, delivery did not: failure text wins.
    let h = harness(Ok("content".into()), good_summary(), false);
    let reply = h
        .pipeline
        .run(note("https://example.com/page"), SummaryMode::Brief)
        .await;
    assert_eq!(reply, "❌ couldn't send to inbox");

    // Same fixed text on the plain path.
    let h = harness(Ok("unused".into()), good_summary(), false);
    let reply = h.pipeline.run(note("hello"), SummaryMode::Brief).await;
    assert_eq!(reply, "❌ couldn't send to inbox");
}

// ── Scenario E: /s with no content ──────────────────────────────────

fn test_config() -> Arc<Config> {
    Arc::new(Config {
        telegram: TelegramConfig {
            bot_token: SecretString::from("123:ABC"),
            allowed_user_ids: vec![42],
            allowed_chat_ids: vec![99],
        },
        inbox: InboxConfig {
            token: None,
            api_url: "http://localhost/unused".to_string(),
        },
        ai: AiConfig {
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
        },
        replies: ReplyTexts::default(),
        debug: false,
    })
}

#[tokio::test]
async fn save_without_content_never_starts_pipeline() {
    let h = harness(Ok("unused".into()), good_summary(), true);
    let config = test_config();
    let channel = TelegramChannel::new(config.telegram.clone());
    let bot = Bot::new(config, channel, h.pipeline, "testhost".to_string());

    let message = TelegramMessage {
        chat_id: 99,
        user_id: 42,
        sender_name: "alice".to_string(),
        text: "/s".to_string(),
    };
    let reply = bot.handle(&message).await;

    assert_eq!(
        reply.as_deref(),
        Some("Please provide content to save after the /s command")
    );
    assert!(h.inbox.pushed.lock().unwrap().is_empty());
    assert_eq!(*h.summarizer.calls.lock().unwrap(), 0);
}

// ── Article mode shares the pipeline ────────────────────────────────

#[tokio::test]
async fn article_mode_runs_the_same_pipeline() {
    let h = harness(
        Ok("unused".into()),
        Ok(Summary {
            headline: "Long Read".to_string(),
            body: "## Intro\nFormatted article.".to_string(),
        }),
        true,
    );

    let long = "a".repeat(200);
    let reply = h.pipeline.run(note(&long), SummaryMode::Article).await;

    assert_eq!(reply, "✔️ sent as \"Long Read\"");
    let pushed = h.inbox.pushed.lock().unwrap();
    assert!(pushed[0].content.starts_with("## Long Read\n"));
}

// ── Idempotence ─────────────────────────────────────────────────────

#[tokio::test]
async fn identical_notes_at_same_timestamp_render_identically() {
    let fixed = note("same text");

    let h1 = harness(Ok("unused".into()), good_summary(), true);
    let h2 = harness(Ok("unused".into()), good_summary(), true);
    h1.pipeline.run(fixed.clone(), SummaryMode::Brief).await;
    h2.pipeline.run(fixed, SummaryMode::Brief).await;

    let a = h1.inbox.pushed.lock().unwrap();
    let b = h2.inbox.pushed.lock().unwrap();
    assert_eq!(a[0], b[0]);
}
