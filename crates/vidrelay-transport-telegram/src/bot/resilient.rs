//! Status message operations.
//!
//! `sendMessage` is not idempotent: a timeout after Telegram accepted the
//! request would show the user a second message, so sends get exactly one
//! attempt. Edits replace the same text and are retried on transient
//! failures with exponential backoff and jitter.

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Message, MessageId, ReplyParameters};
use tracing::debug;
use vidrelay_core::utils::{retry_telegram_operation, truncate_str};

/// Telegram rejects texts above 4096 characters
const MAX_TEXT_CHARS: usize = 4000;

const ERROR_NOT_MODIFIED: &str = "message is not modified";
const ERROR_NOT_FOUND: &str = "message to edit not found";

fn clamp_text(text: &str) -> String {
    if text.chars().count() > MAX_TEXT_CHARS {
        format!("{}...", truncate_str(text, MAX_TEXT_CHARS))
    } else {
        text.to_string()
    }
}

/// Send a text reply to `reply_to`. Single attempt.
///
/// # Errors
///
/// Returns the Telegram error if the request fails.
pub async fn send_reply(
    bot: &Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    text: &str,
) -> Result<Message> {
    bot.send_message(chat_id, clamp_text(text))
        .reply_parameters(ReplyParameters::new(reply_to))
        .await
        .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
}

/// Edit a message text, retrying on network failures.
///
/// Returns `Ok(false)` when Telegram reports the message as unchanged or
/// gone; neither is worth retrying.
///
/// # Errors
///
/// Returns the last error after all retries are exhausted.
pub async fn edit_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    msg_id: MessageId,
    text: &str,
) -> Result<bool> {
    let text = clamp_text(text);
    retry_telegram_operation(|| async {
        match bot.edit_message_text(chat_id, msg_id, text.clone()).await {
            Ok(_) => Ok(true),
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains(ERROR_NOT_MODIFIED) || err_msg.contains(ERROR_NOT_FOUND) {
                    debug!("Message update skipped: {err_msg}");
                    return Ok(false);
                }
                Err(anyhow::anyhow!("Telegram edit error: {e}"))
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use vidrelay_core::config::TELEGRAM_API_MAX_RETRIES;

    /// Bot API stand-in that reads each request and hangs up without
    /// answering, the way a dropped response looks to the client.
    async fn silent_api() -> anyhow::Result<(Bot, Arc<AtomicUsize>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = vec![0_u8; 16 * 1024];
                let _ = socket.read(&mut buf).await;
            }
        });

        let bot = Bot::new("123456:TEST").set_api_url(format!("http://{addr}/").parse()?);
        Ok((bot, requests))
    }

    #[test]
    fn test_clamp_text() {
        assert_eq!(clamp_text("📥 Скачиваю видео..."), "📥 Скачиваю видео...");

        let long = "я".repeat(5000);
        let clamped = clamp_text(&long);
        assert_eq!(clamped.chars().count(), MAX_TEXT_CHARS + 3);
        assert!(clamped.ends_with("..."));
    }

    #[tokio::test]
    async fn test_failed_send_is_not_repeated() -> anyhow::Result<()> {
        let (bot, requests) = silent_api().await?;

        let result = send_reply(&bot, ChatId(1), MessageId(10), "⏳ Начинаю скачивание видео...").await;

        assert!(result.is_err());
        assert_eq!(requests.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_edit_is_retried() -> anyhow::Result<()> {
        let (bot, requests) = silent_api().await?;

        let result = edit_message_resilient(&bot, ChatId(1), MessageId(11), "📥 Скачиваю видео...").await;

        assert!(result.is_err());
        assert_eq!(requests.load(Ordering::SeqCst), TELEGRAM_API_MAX_RETRIES);
        Ok(())
    }
}
