pub mod bot;
pub mod config;
pub mod downloader;
pub mod link;
pub mod liveness;
pub mod transport;
pub mod uptime;

#[cfg(test)]
mod testing;

use bot::BotContext;
use config::{Config, Secrets};
use downloader::{DownloadSettings, Orchestrator, YtDlpExtractor};
use link::{RedirectResolver, ResolveError};
use std::sync::Arc;
use teloxide::Bot;
use transport::TelegramTransport;
use uptime::Uptime;

/// Wire the collaborators together from configuration.
pub fn build_context(
    bot: Bot,
    config: &Config,
    secrets: &Secrets,
    uptime: Uptime,
) -> Result<BotContext, ResolveError> {
    let transport = Arc::new(TelegramTransport::new(bot));
    let extractor = Arc::new(YtDlpExtractor::new(&config.ytdlp_path));
    let resolver = Arc::new(RedirectResolver::new(config.redirect_timeout())?);
    let orchestrator = Orchestrator::new(
        transport.clone(),
        extractor,
        DownloadSettings {
            download_dir: config.download_dir(),
            format: config.format.clone(),
            caption: config.caption.clone(),
            progress_interval: config.progress_interval(),
        },
    );

    Ok(BotContext::new(secrets.owner_id, uptime, transport, resolver, orchestrator))
}

/// Start the liveness endpoint and the bot, and run until the bot stops.
pub async fn run(config: Config, secrets: Secrets) -> Result<(), Box<dyn std::error::Error>> {
    let uptime = Uptime::start();
    let port = std::env::var(config::PORT_VAR).ok();
    let liveness_addr = config.liveness_addr(port.as_deref())?;

    tokio::fs::create_dir_all(config.download_dir()).await?;

    let extractor = YtDlpExtractor::new(&config.ytdlp_path);
    if !extractor.available().await {
        tracing::warn!(binary = %config.ytdlp_path, "yt-dlp not found; downloads will fail");
    }

    let liveness_task = tokio::spawn(async move {
        if let Err(e) = liveness::serve(liveness_addr).await {
            tracing::error!(addr = %liveness_addr, error = %e, "liveness endpoint stopped");
        }
    });

    let telegram = Bot::new(&secrets.bot_token);
    let ctx = Arc::new(build_context(telegram.clone(), &config, &secrets, uptime)?);
    tracing::info!(download_dir = %config.download_dir, "bot started");

    bot::dispatch(telegram, ctx).await;

    liveness_task.abort();
    tracing::info!("bot stopped");
    Ok(())
}
