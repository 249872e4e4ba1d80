/// Telegram implementation of the runtime chat transport
pub mod chat_transport;
/// Command and message handlers
pub mod handlers;
/// Status message operations: single-attempt sends, retried edits
pub mod resilient;

pub use chat_transport::TelegramChatTransport;
