//! Error types for notegram.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Telegram channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}

/// Enrichment-stage errors. Always recoverable: the save pipeline
/// degrades to a plain template, it never aborts on these.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("Content fetch failed: {0}")]
    Fetch(String),

    #[error("Summarizer request failed: {0}")]
    Summarize(String),

    #[error("Invalid summarizer response: {0}")]
    InvalidResponse(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Forwarding errors from the inbox capability. Surfaced to the user
/// as the fixed failure notification; never retried.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Inbox request failed: {0}")]
    Transport(String),

    #[error("Inbox rejected submission: {0}")]
    Rejected(String),
}
