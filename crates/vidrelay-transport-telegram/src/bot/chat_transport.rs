//! Telegram implementation of [`ChatTransport`].

use super::resilient::{edit_message_resilient, send_reply};
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId, ReplyParameters};
use vidrelay_runtime::{ChatTransport, StatusHandle};

/// Chat transport bound to one incoming message.
///
/// Every reply is threaded under the message that carried the link.
pub struct TelegramChatTransport {
    bot: Bot,
    chat_id: ChatId,
    reply_to: MessageId,
}

impl TelegramChatTransport {
    /// Bind a transport to `reply_to` in `chat_id`.
    #[must_use]
    pub const fn new(bot: Bot, chat_id: ChatId, reply_to: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            reply_to,
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramChatTransport {
    async fn reply_text(&self, text: &str) -> Result<StatusHandle> {
        let msg = send_reply(&self.bot, self.chat_id, self.reply_to, text).await?;
        Ok(StatusHandle(msg.id.0))
    }

    async fn edit_text(&self, handle: StatusHandle, text: &str) -> Result<()> {
        edit_message_resilient(&self.bot, self.chat_id, MessageId(handle.0), text).await?;
        Ok(())
    }

    async fn delete_message(&self, handle: StatusHandle) -> Result<()> {
        self.bot
            .delete_message(self.chat_id, MessageId(handle.0))
            .await
            .map_err(|e| anyhow::anyhow!("Telegram delete error: {e}"))?;
        Ok(())
    }

    async fn reply_video(&self, path: &Path, caption: &str) -> Result<()> {
        // Single attempt: a retried upload could deliver the video twice
        self.bot
            .send_video(self.chat_id, InputFile::file(path))
            .caption(caption)
            .supports_streaming(true)
            .reply_parameters(ReplyParameters::new(self.reply_to))
            .await
            .map_err(|e| anyhow::anyhow!("Telegram upload error: {e}"))?;
        Ok(())
    }
}
