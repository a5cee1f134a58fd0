//! Content-fetch capability — turns a URL into readable text.
//!
//! GET with a browser User-Agent and a hard timeout, then HTML cleanup:
//! scripts, styles and page chrome dropped, tags stripped, entities
//! decoded, whitespace collapsed. Output is prefixed with the URL and
//! page title and capped at the summarizer's content ceiling.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::error::EnrichError;
use crate::pipeline::enrich::truncate_for_summary;
use crate::pipeline::types::ContentFetcher;

/// Fetch timeout. A stalled page must not hang the save invocation.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like User-Agent; some sites refuse default client agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static SCRIPT_BLOCKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_BLOCKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static CHROME_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(nav|footer|header)[^>]*>.*?</(nav|footer|header)>").expect("valid regex")
});
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n\s*").expect("valid regex"));

/// HTTP-backed fetcher.
pub struct HttpContentFetcher {
    client: reqwest::Client,
}

impl HttpContentFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("static client configuration");
        Self { client }
    }
}

impl Default for HttpContentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> Result<String, EnrichError> {
        info!("Fetching URL content");
        debug!(%url, "Fetch target");

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| EnrichError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Fetch(format!("HTTP status {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| EnrichError::Fetch(e.to_string()))?;

        Ok(extract_page_text(&html, url))
    }
}

/// Reduce an HTML document to the text block handed to the summarizer.
pub fn extract_page_text(html: &str, url: &str) -> String {
    let title = extract_title(html);
    debug!(title = %title, "Page title extracted");

    let cleaned = SCRIPT_BLOCKS.replace_all(html, " ");
    let cleaned = STYLE_BLOCKS.replace_all(&cleaned, " ");
    let cleaned = CHROME_BLOCKS.replace_all(&cleaned, " ");
    let cleaned = TAGS.replace_all(&cleaned, " ");
    let decoded = html_escape::decode_html_entities(&cleaned);

    let collapsed = SPACE_RUNS.replace_all(&decoded, " ");
    let collapsed = BLANK_RUNS.replace_all(&collapsed, "\n");
    let body = collapsed.trim();

    truncate_for_summary(&format!("URL: {url}\nTitle: {title}\n\nContent:\n{body}"))
}

fn extract_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("title") else {
        return "No title".to_string();
    };
    document
        .select(&selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No title".to_string())
}
