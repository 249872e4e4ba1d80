//! Configuration and settings management
//!
//! Loads download settings from config files and environment variables and
//! defines the transport-independent constants.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Largest attachment the Telegram Bot API accepts from bots (50 MiB).
pub const TELEGRAM_UPLOAD_LIMIT_BYTES: u64 = 50 * 1024 * 1024;

/// Maximum attempts for retryable Telegram text operations
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff for Telegram API retries (milliseconds)
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound for a single Telegram API retry delay (milliseconds)
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 5000;

/// Builds the layered configuration source shared by all settings structs.
///
/// Order (later wins): `config/default`, `config/{RUN_MODE}`, `config/local`,
/// `APP__*` environment variables, plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if a present config file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, not checked into git
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Environment::default() maps UPPER_SNAKE_CASE to snake_case keys;
        // empty variables are treated as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Settings for the extraction adapter and the delivery workflow
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DownloadSettings {
    /// Working directory for downloaded files
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Path or name of the yt-dlp executable
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,

    /// Explicit yt-dlp format expression; derived from `max_height` when unset
    pub ytdlp_format: Option<String>,

    /// Output filename template, relative to the request directory
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Resolution ceiling (video height in pixels)
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// User-Agent presented to upstream platforms
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra HTTP headers, `Name: value` pairs separated by `|`
    #[serde(default = "default_extra_headers")]
    pub extra_headers: String,

    /// Player clients requested from YouTube (`--extractor-args`)
    #[serde(default = "default_youtube_player_client")]
    pub youtube_player_client: String,

    /// Download every request into its own subdirectory
    #[serde(default = "default_true")]
    pub download_isolation: bool,

    /// Kill yt-dlp after this many seconds; no limit when unset
    pub extraction_timeout_secs: Option<u64>,

    /// Files strictly larger than this are not uploaded
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_output_template() -> String {
    "%(title)s.%(ext)s".to_string()
}

const fn default_max_height() -> u32 {
    720
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
        .to_string()
}

fn default_extra_headers() -> String {
    "Accept-Language: en-US,en;q=0.9|Sec-Fetch-Mode: navigate".to_string()
}

fn default_youtube_player_client() -> String {
    "android,web".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_max_upload_bytes() -> u64 {
    TELEGRAM_UPLOAD_LIMIT_BYTES
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            ytdlp_path: default_ytdlp_path(),
            ytdlp_format: None,
            output_template: default_output_template(),
            max_height: default_max_height(),
            user_agent: default_user_agent(),
            extra_headers: default_extra_headers(),
            youtube_player_client: default_youtube_player_client(),
            download_isolation: true,
            extraction_timeout_secs: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl DownloadSettings {
    /// Load download settings from config files and the environment.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vidrelay_core::config::DownloadSettings;
    ///
    /// let settings = DownloadSettings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// yt-dlp format expression: an mp4 single file under the resolution
    /// ceiling, then any single file under it, then whatever is best.
    #[must_use]
    pub fn format_selector(&self) -> String {
        if let Some(format) = self.ytdlp_format.as_ref().filter(|f| !f.trim().is_empty()) {
            return format.clone();
        }
        let h = self.max_height;
        format!("best[ext=mp4][height<={h}]/best[height<={h}]/best[ext=mp4]/best")
    }

    /// Parsed extra headers as `(name, value)` pairs; malformed entries are skipped.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        self.extra_headers
            .split('|')
            .filter_map(|entry| {
                let (name, value) = entry.split_once(':')?;
                let name = name.trim();
                let value = value.trim();
                (!name.is_empty() && !value.is_empty())
                    .then(|| (name.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Optional extraction timeout.
    #[must_use]
    pub fn extraction_timeout(&self) -> Option<Duration> {
        self.extraction_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_defaults() {
        let settings = DownloadSettings::default();
        assert_eq!(settings.download_dir, PathBuf::from("downloads"));
        assert_eq!(settings.output_template, "%(title)s.%(ext)s");
        assert_eq!(settings.max_upload_bytes, 52_428_800);
        assert!(settings.download_isolation);
        assert!(settings.extraction_timeout().is_none());
    }

    #[test]
    fn test_format_selector_uses_height_ceiling() {
        let settings = DownloadSettings {
            max_height: 480,
            ..DownloadSettings::default()
        };
        assert_eq!(
            settings.format_selector(),
            "best[ext=mp4][height<=480]/best[height<=480]/best[ext=mp4]/best"
        );
    }

    #[test]
    fn test_explicit_format_wins() {
        let mut settings = DownloadSettings {
            ytdlp_format: Some("best[ext=mp4]/best".to_string()),
            ..DownloadSettings::default()
        };
        assert_eq!(settings.format_selector(), "best[ext=mp4]/best");

        // Blank override falls back to the derived expression
        settings.ytdlp_format = Some("  ".to_string());
        assert!(settings.format_selector().contains("height<=720"));
    }

    #[test]
    fn test_header_parsing() {
        let settings = DownloadSettings {
            extra_headers: "Accept-Language: ru-RU,ru;q=0.9 | broken | Referer: https://www.tiktok.com/|: x"
                .to_string(),
            ..DownloadSettings::default()
        };
        let headers = settings.headers();
        assert_eq!(
            headers,
            vec![
                ("Accept-Language".to_string(), "ru-RU,ru;q=0.9".to_string()),
                ("Referer".to_string(), "https://www.tiktok.com/".to_string()),
            ]
        );
    }

    #[test]
    fn test_zero_timeout_means_unlimited() {
        let settings = DownloadSettings {
            extraction_timeout_secs: Some(0),
            ..DownloadSettings::default()
        };
        assert!(settings.extraction_timeout().is_none());

        let settings = DownloadSettings {
            extraction_timeout_secs: Some(90),
            ..DownloadSettings::default()
        };
        assert_eq!(settings.extraction_timeout(), Some(Duration::from_secs(90)));
    }

    // Single test touching the environment to avoid races between tests
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("DOWNLOAD_DIR", "/tmp/vidrelay-test");
        env::set_var("MAX_HEIGHT", "1080");
        env::set_var("DOWNLOAD_ISOLATION", "false");

        let settings = DownloadSettings::new()?;
        assert_eq!(settings.download_dir, PathBuf::from("/tmp/vidrelay-test"));
        assert_eq!(settings.max_height, 1080);
        assert!(!settings.download_isolation);

        env::remove_var("DOWNLOAD_DIR");
        env::remove_var("MAX_HEIGHT");
        env::remove_var("DOWNLOAD_ISOLATION");

        // Empty env var is ignored and the default applies
        env::set_var("DOWNLOAD_DIR", "");
        let settings = DownloadSettings::new()?;
        assert_eq!(settings.download_dir, PathBuf::from("downloads"));
        env::remove_var("DOWNLOAD_DIR");
        Ok(())
    }
}
