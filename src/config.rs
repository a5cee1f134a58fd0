//! Configuration types.
//!
//! All configuration is read from the environment exactly once in `main`
//! and handed to components explicitly. No module reads env vars at
//! call time.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default SiYuan cloud-shorthand endpoint.
pub const DEFAULT_INBOX_URL: &str = "https://liuyun.io/apis/siyuan/inbox/addCloudShorthand";

/// Default OpenAI model for enrichment.
pub const DEFAULT_AI_MODEL: &str = "gpt-3.5-turbo";

/// Top-level bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub inbox: InboxConfig,
    pub ai: AiConfig,
    pub replies: ReplyTexts,
    /// When true, message content may appear in logs at DEBUG level.
    pub debug: bool,
}

/// Telegram transport configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Numeric user ids allowed to issue commands. Empty means deny all.
    pub allowed_user_ids: Vec<i64>,
    /// Numeric chat ids allowed to issue commands. Empty means deny all.
    pub allowed_chat_ids: Vec<i64>,
}

/// Inbox push capability configuration.
#[derive(Debug, Clone)]
pub struct InboxConfig {
    /// Bearer-style token. Absent token makes every forward fail with a
    /// configuration diagnostic instead of crashing the process.
    pub token: Option<SecretString>,
    pub api_url: String,
}

/// Summarizer capability configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Absent key disables enrichment: the summarize stage reports a
    /// missing-credential failure and the pipeline degrades.
    pub api_key: Option<SecretString>,
    pub model: String,
}

/// User-facing reply texts, overridable via TXT_* env vars.
#[derive(Debug, Clone)]
pub struct ReplyTexts {
    pub general_help: String,
    pub missing_content: String,
    pub send_failed: String,
    pub send_success: String,
    /// Template; `{title}` is replaced with the headline or custom title.
    pub send_success_with_title: String,
    pub help_text: String,
}

impl Default for ReplyTexts {
    fn default() -> Self {
        Self {
            general_help: "Hmm, check /help to see how I may assist you...".to_string(),
            missing_content: "Please provide content to save after the /s command".to_string(),
            send_failed: "❌ couldn't send to inbox".to_string(),
            send_success: "✔️ sent".to_string(),
            send_success_with_title: "✔️ sent as \"{title}\"".to_string(),
            help_text: "\nAvailable commands:\n/help - Show this help message\n\
                        /s [message] - Save a message to the inbox\n\
                        /a [message] - Save as a formatted article\n\
                        /stats - Get system statistics\n\n\
                        You can also send any message, but it won't be saved \n\
                        without using the /s command.\n"
                .to_string(),
        }
    }
}

impl ReplyTexts {
    /// Render the titled success reply.
    pub fn success_with_title(&self, title: &str) -> String {
        self.send_success_with_title.replace("{title}", title)
    }

    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            general_help: env_or("TXT_GENERAL_HELP", defaults.general_help),
            missing_content: env_or("TXT_MISSING_CONTENT", defaults.missing_content),
            send_failed: env_or("TXT_SEND_FAILED", defaults.send_failed),
            send_success: env_or("TXT_SEND_SUCCESS", defaults.send_success),
            send_success_with_title: env_or(
                "TXT_SEND_SUCCESS_WITH_TITLE",
                defaults.send_success_with_title,
            ),
            help_text: env_or("TXT_HELP_TEXT", defaults.help_text),
        }
    }
}

impl Config {
    /// Build the configuration from the environment.
    ///
    /// Only `TELEGRAM_BOT_TOKEN` is hard-required. Missing inbox/AI
    /// credentials are carried as `None` so the corresponding capability
    /// fails per-call instead of preventing startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()))?;

        let allowed_user_ids = parse_id_list(
            "ALLOWED_USERIDS",
            &std::env::var("ALLOWED_USERIDS").unwrap_or_default(),
        )?;
        let allowed_chat_ids = parse_id_list(
            "ALLOWED_CHATIDS",
            &std::env::var("ALLOWED_CHATIDS").unwrap_or_default(),
        )?;

        Ok(Self {
            telegram: TelegramConfig {
                bot_token: SecretString::from(bot_token),
                allowed_user_ids,
                allowed_chat_ids,
            },
            inbox: InboxConfig {
                token: std::env::var("SIYUAN_TOKEN").ok().map(SecretString::from),
                api_url: env_or("SIYUAN_INBOX_URL", DEFAULT_INBOX_URL.to_string()),
            },
            ai: AiConfig {
                api_key: std::env::var("OPENAI_TOKEN").ok().map(SecretString::from),
                model: env_or("OPENAI_MODEL", DEFAULT_AI_MODEL.to_string()),
            },
            replies: ReplyTexts::from_env(),
            debug: parse_bool(&std::env::var("DEBUG").unwrap_or_default()),
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

/// Parse a comma-separated list of numeric ids.
fn parse_id_list(key: &str, raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{s}' is not a numeric id"),
            })
        })
        .collect()
}

/// Truthy parsing matching the original service: "true", "1", "t".
fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "t")
}
