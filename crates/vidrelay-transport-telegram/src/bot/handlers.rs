use crate::bot::chat_transport::TelegramChatTransport;
use anyhow::Result;
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::info;
use vidrelay_core::extractor::YtDlpExtractor;
use vidrelay_runtime::{DeliveryOutcome, DeliveryRequest, DeliveryWorkflow};

/// Delivery workflow backed by the yt-dlp adapter
pub type VideoWorkflow = DeliveryWorkflow<YtDlpExtractor>;

const WELCOME_TEXT: &str = "👋 Привет! Я бот для скачивания видео.\n\n\
     Я могу скачивать видео с:\n\
     • YouTube\n\
     • TikTok\n\
     • Instagram\n\n\
     Просто отправьте мне ссылку на видео!";

const HELP_TEXT: &str = "📖 Как использовать:\n\n\
     1. Скопируйте ссылку на видео\n\
     2. Отправьте её мне\n\
     3. Подождите, пока я скачаю видео\n\
     4. Получите готовое видео!\n\n\
     Поддерживаемые платформы:\n\
     • YouTube (youtube.com, youtu.be)\n\
     • TikTok (tiktok.com)\n\
     • Instagram (instagram.com)\n\n\
     Команды:\n\
     /start - Начать работу\n\
     /help - Показать эту справку";

/// Display name of the sender: username, then first name, then "Unknown".
#[must_use]
pub fn get_user_name(msg: &Message) -> String {
    if let Some(ref user) = msg.from {
        if let Some(ref username) = user.username {
            return username.clone();
        }
        if !user.first_name.is_empty() {
            return user.first_name.clone();
        }
    }
    "Unknown".to_string()
}

/// Sender id, or 0 for messages without a sender (channel posts).
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Text worth handing to the delivery workflow: anything that is not a
/// `/command`. Unknown commands are ignored rather than rejected as links.
#[must_use]
pub fn is_link_candidate(text: &str) -> bool {
    !text.starts_with('/')
}

/// Bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Поддерживаемые команды:")]
pub enum Command {
    /// Welcome message
    #[command(description = "Начать работу.")]
    Start,
    /// Usage instructions
    #[command(description = "Показать справку.")]
    Help,
}

/// Start handler
///
/// # Errors
///
/// Returns an error if the welcome message cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let user_name = get_user_name(&msg);
    info!("User {user_id} ({user_name}) sent /start.");
    bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
    Ok(())
}

/// Help handler
///
/// # Errors
///
/// Returns an error if the help message cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, HELP_TEXT).await?;
    Ok(())
}

/// Video link handler: runs one delivery for the message text.
///
/// # Errors
///
/// Returns an error if the initial reply cannot be sent.
pub async fn handle_video_request(
    bot: Bot,
    msg: Message,
    workflow: Arc<VideoWorkflow>,
) -> Result<DeliveryOutcome> {
    let request = DeliveryRequest {
        url: msg.text().unwrap_or_default().to_string(),
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        user_id: get_user_id_safe(&msg),
    };
    info!(
        "User {} ({}) requested a video in chat {}.",
        request.user_id,
        get_user_name(&msg),
        request.chat_id
    );

    let transport = TelegramChatTransport::new(bot, msg.chat.id, msg.id);
    workflow.run(&transport, &request).await
}
