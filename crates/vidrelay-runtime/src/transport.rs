use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Handle of a message previously sent by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusHandle(pub i32);

/// Outbound side of one chat, bound to the message that started the request.
///
/// Replies are addressed to the originating message; implementations decide
/// how (Telegram uses reply parameters).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a text reply and return a handle to it.
    async fn reply_text(&self, text: &str) -> Result<StatusHandle>;

    /// Replace the text of a previously sent message.
    async fn edit_text(&self, handle: StatusHandle, text: &str) -> Result<()>;

    /// Delete a previously sent message.
    async fn delete_message(&self, handle: StatusHandle) -> Result<()>;

    /// Upload a local file as a streamable video with a caption.
    async fn reply_video(&self, path: &Path, caption: &str) -> Result<()>;
}
