//! Telegram transport settings.

use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vidrelay_core::config::DownloadSettings;

/// Token used when `TELEGRAM_TOKEN` is not configured.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_TELEGRAM_BOT_TOKEN";

fn default_token() -> String {
    PLACEHOLDER_TOKEN.to_string()
}

/// Telegram transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramSettings {
    /// Telegram Bot API token.
    #[serde(default = "default_token")]
    pub telegram_token: String,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            telegram_token: default_token(),
        }
    }
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Download settings shared with the delivery workflow.
    pub download: Arc<DownloadSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(download: DownloadSettings, telegram: TelegramSettings) -> Self {
        Self {
            download: Arc::new(download),
            telegram: Arc::new(telegram),
        }
    }
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        vidrelay_core::config::build_config()?.try_deserialize()
    }

    /// Whether the token is missing or still the placeholder.
    #[must_use]
    pub fn is_placeholder_token(&self) -> bool {
        let token = self.telegram_token.trim();
        token.is_empty() || token == PLACEHOLDER_TOKEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Config;

    #[test]
    fn test_placeholder_token() {
        let mut settings = TelegramSettings::default();
        assert!(settings.is_placeholder_token());

        settings.telegram_token = "  ".to_string();
        assert!(settings.is_placeholder_token());

        settings.telegram_token = "123456:ABC-DEF".to_string();
        assert!(!settings.is_placeholder_token());
    }

    #[test]
    fn test_token_from_config_source() -> Result<(), ConfigError> {
        let settings: TelegramSettings = Config::builder()
            .set_override("telegram_token", "123456:ABC-DEF")?
            .build()?
            .try_deserialize()?;
        assert_eq!(settings.telegram_token, "123456:ABC-DEF");

        let settings: TelegramSettings = Config::builder().build()?.try_deserialize()?;
        assert_eq!(settings.telegram_token, PLACEHOLDER_TOKEN);
        Ok(())
    }
}
