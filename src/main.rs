use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use notegram::bot::Bot;
use notegram::channels::TelegramChannel;
use notegram::config::Config;
use notegram::fetch::HttpContentFetcher;
use notegram::inbox::SiyuanInbox;
use notegram::pipeline::SavePipeline;
use notegram::summarize::OpenAiSummarizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::from_env().map_err(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export TELEGRAM_BOT_TOKEN=123456:ABC-...");
        anyhow::anyhow!("invalid configuration")
    })?);

    // Console + bot.log, filtered by RUST_LOG (default depends on DEBUG).
    let default_level = if config.debug { "debug" } else { "info" };
    let file_appender = tracing_appender::rolling::never(".", "bot.log");
    let (file_writer, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    tracing::info!("notegram v{}", env!("CARGO_PKG_VERSION"));

    if config.ai.api_key.is_none() {
        tracing::warn!("OPENAI_TOKEN not set. AI summary features will not work.");
    }
    if config.inbox.token.is_none() {
        tracing::warn!("SIYUAN_TOKEN not set. Saves will fail until it is configured.");
    }
    if config.telegram.allowed_user_ids.is_empty() || config.telegram.allowed_chat_ids.is_empty() {
        tracing::warn!("ALLOWED_USERIDS/ALLOWED_CHATIDS empty; all messages will be ignored.");
    }

    let origin_host = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    let pipeline = SavePipeline::new(
        Arc::new(HttpContentFetcher::new()),
        Arc::new(OpenAiSummarizer::new(config.ai.clone())),
        Arc::new(SiyuanInbox::new(config.inbox.clone())),
        config.replies.clone(),
    );

    let channel = TelegramChannel::new(config.telegram.clone());
    if let Err(e) = channel.health_check().await {
        tracing::error!(error = %e, "Telegram health check failed");
        anyhow::bail!("could not reach the Telegram Bot API");
    }

    tracing::info!("Bot started");
    Bot::new(config, channel, pipeline, origin_host).run().await;

    Ok(())
}
