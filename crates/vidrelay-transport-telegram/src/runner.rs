use crate::bot;
use crate::bot::handlers::{is_link_candidate, Command, VideoWorkflow};
use crate::config::BotSettings;
use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::dispatching::{ShutdownToken, UpdateHandler};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vidrelay_core::extractor::YtDlpExtractor;
use vidrelay_runtime::DeliveryOutcome;

/// Run the Telegram transport until SIGINT/SIGTERM or until polling stops.
///
/// # Errors
///
/// Returns an error if the bot cannot be started.
pub async fn run_bot(settings: Arc<BotSettings>) -> Result<()> {
    let mut running = BotShell::new(settings).start().await?;

    let signalled = tokio::select! {
        () = shutdown_signal() => true,
        () = running.finished() => false,
    };

    if signalled {
        info!("Shutdown signal received, stopping bot...");
        running.stop().await;
    } else {
        warn!("Dispatcher stopped on its own.");
    }

    info!("Bot stopped.");
    Ok(())
}

/// Not-yet-started bot: settings plus the Telegram client.
pub struct BotShell {
    bot: Bot,
    settings: Arc<BotSettings>,
}

/// Bot whose dispatcher is polling in a background task.
pub struct RunningBot {
    shutdown: ShutdownToken,
    handle: JoinHandle<()>,
}

impl BotShell {
    /// Create a shell; nothing touches the network until [`start`](Self::start).
    #[must_use]
    pub fn new(settings: Arc<BotSettings>) -> Self {
        let bot = Bot::new(settings.telegram.telegram_token.clone());
        Self { bot, settings }
    }

    /// Prepare the download directory, register commands and start polling.
    ///
    /// # Errors
    ///
    /// Returns an error if the download directory cannot be created.
    pub async fn start(self) -> Result<RunningBot> {
        let download = Arc::clone(&self.settings.download);
        vidrelay_core::fs::ensure_download_dir(&download.download_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create download directory {}",
                    download.download_dir.display()
                )
            })?;
        info!(
            "Download directory: {} (isolation: {})",
            download.download_dir.display(),
            download.download_isolation
        );

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Failed to register bot commands: {e}");
        }

        let workflow: Arc<VideoWorkflow> = Arc::new(VideoWorkflow::new(
            YtDlpExtractor::new(&download),
            download,
        ));

        let mut dispatcher = Dispatcher::builder(self.bot, setup_handler())
            .dependencies(dptree::deps![workflow])
            .default_handler(|upd| async move {
                debug!("Unhandled update: {:?}", upd.kind);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .build();

        let shutdown = dispatcher.shutdown_token();
        let handle = tokio::spawn(async move {
            dispatcher.dispatch().await;
        });

        info!("Bot is running...");
        Ok(RunningBot { shutdown, handle })
    }
}

impl RunningBot {
    /// Stop polling and wait for in-flight handlers to finish.
    pub async fn stop(self) {
        match self.shutdown.shutdown() {
            Ok(done) => done.await,
            // Dispatcher has not started polling yet
            Err(_) => self.handle.abort(),
        }
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                error!("Dispatcher task failed: {e}");
            }
        }
    }

    /// Resolves when the dispatcher task ends without [`stop`](Self::stop).
    pub async fn finished(&mut self) {
        if let Err(e) = (&mut self.handle).await {
            error!("Dispatcher task failed: {e}");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some_and(is_link_candidate))
                .endpoint(handle_text),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg).await,
        Command::Help => bot::handlers::help(bot, msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_text(
    bot: Bot,
    msg: Message,
    workflow: Arc<VideoWorkflow>,
) -> Result<(), teloxide::RequestError> {
    let chat_id = msg.chat.id;
    match bot::handlers::handle_video_request(bot, msg, workflow).await {
        Ok(DeliveryOutcome::Completed { size, .. }) => {
            debug!("Delivery to chat {chat_id} completed ({size} bytes).");
        }
        Ok(outcome) => debug!("Delivery to chat {chat_id} ended: {outcome:?}"),
        Err(e) => error!("Video handler error in chat {chat_id}: {e}"),
    }
    respond(())
}
