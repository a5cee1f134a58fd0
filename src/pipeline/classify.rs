//! Classifier — pure URL / length detection.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::types::Classification;

/// Inputs longer than this (in characters) trigger enrichment.
pub const LONG_THRESHOLD: usize = 128;

/// Permissive URL shape: scheme, then something with a dot in it.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\S+\.\S+").expect("valid URL regex"));

/// Classify raw text. Pure and total: no side effects, no failure mode.
pub fn classify(text: &str) -> Classification {
    Classification {
        is_url: is_url(text),
        is_long: is_long(text),
    }
}

/// True iff the trimmed text looks like an http(s) URL.
///
/// Both checks the original service ran are kept: the regex match and
/// the plain scheme-prefix test. Either one suffices.
pub fn is_url(text: &str) -> bool {
    let trimmed = text.trim();
    URL_PATTERN.is_match(trimmed)
        || trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
}

/// True iff the text exceeds the long-input threshold.
pub fn is_long(text: &str) -> bool {
    text.chars().count() > LONG_THRESHOLD
}
