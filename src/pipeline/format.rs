//! Formatter — renders the final title and markdown body.
//!
//! Three mutually exclusive render modes, in precedence order:
//! AI-composite (enrichment succeeded), URL-plain, Text-plain.
//! Deterministic given the same note and enrichment: identical inputs
//! at the same timestamp render byte-identical output.

use tracing::debug;

use crate::pipeline::types::{
    Classification, Enrichment, ForwardPayload, IncomingNote, RenderedNote,
};

/// Max URL characters quoted in the URL-plain title.
const URL_TITLE_CHARS: usize = 30;

/// Timestamp format used in every template and title.
const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M";

/// Reply label for degraded URL saves.
const URL_BOOKMARK_LABEL: &str = "URL bookmark";

/// Render a note into the payload for the inbox, plus the reply label
/// the notifier quotes back on success.
pub fn render(
    note: &IncomingNote,
    classification: Classification,
    enrichment: &Enrichment,
) -> RenderedNote {
    if enrichment.used_ai {
        render_ai_composite(note, enrichment)
    } else if classification.is_url {
        render_url_plain(note)
    } else {
        render_text_plain(note)
    }
}

fn render_ai_composite(note: &IncomingNote, enrichment: &Enrichment) -> RenderedNote {
    // used_ai guarantees both fields; empty strings would only come from
    // a summarizer bug and still render a valid payload.
    let headline = enrichment.headline.as_deref().unwrap_or_default();
    let summary = enrichment.summary.as_deref().unwrap_or_default();
    debug!("Rendering AI-composite template");

    let content = format!(
        "## {headline}\n{summary}\n\n## input via telegram\n\
         **SUBMIT:** {timestamp}\n**BY:** {user}@{host}\n\n{display}\n",
        timestamp = note.received_at.format(TIMESTAMP_FMT),
        user = note.sender_name,
        host = note.origin_host,
        display = enrichment.display_content,
    );
    let title = format!("{} {}", note.received_at.format("%Y-%m-%d"), headline);

    RenderedNote {
        payload: ForwardPayload { title, content },
        reply_label: Some(headline.to_string()),
    }
}

fn render_url_plain(note: &IncomingNote) -> RenderedNote {
    let url = note.raw_text.trim();
    debug!("Rendering URL bookmark template");

    let content = format!(
        "## URL Bookmark\n**SUBMIT:** {timestamp}\n**BY:** {user}@{host}\n\n[{url}]({url})\n",
        timestamp = note.received_at.format(TIMESTAMP_FMT),
        user = note.sender_name,
        host = note.origin_host,
    );

    let head: String = url.chars().take(URL_TITLE_CHARS).collect();
    let suffix = if url.chars().count() > URL_TITLE_CHARS {
        "..."
    } else {
        ""
    };
    let title = format!("URL: {head}{suffix}");

    RenderedNote {
        payload: ForwardPayload { title, content },
        reply_label: Some(URL_BOOKMARK_LABEL.to_string()),
    }
}

fn render_text_plain(note: &IncomingNote) -> RenderedNote {
    debug!("Rendering plain text template");

    let content = format!(
        "## input via telegram\n**SUBMIT:** {timestamp}\n**BY:** {user}@{host}\n\n\
         ```\n{text}\n```",
        timestamp = note.received_at.format(TIMESTAMP_FMT),
        user = note.sender_name,
        host = note.origin_host,
        text = note.raw_text,
    );
    let title = format!("telegram {}", note.received_at.format(TIMESTAMP_FMT));

    RenderedNote {
        payload: ForwardPayload { title, content },
        reply_label: None,
    }
}
