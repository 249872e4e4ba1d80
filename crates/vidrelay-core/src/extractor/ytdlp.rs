//! yt-dlp extraction adapter
//!
//! Runs yt-dlp as a child process and asks it to print the final file path
//! and title as JSON once the file has been moved into place.

use super::{ExtractError, ExtractedMedia, MediaExtractor};
use crate::classifier::{classify, Platform};
use crate::config::DownloadSettings;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Printed by yt-dlp after post-processing: `{"title": ..., "filepath": ...}`
const PRINT_TEMPLATE: &str = "after_move:%(.{title,filepath})j";

/// Title used when the platform reports none
pub const DEFAULT_TITLE: &str = "Видео";

/// Stderr fragments meaning the content itself cannot be fetched
const PERMANENT_ERROR_PATTERNS: &[&str] = &[
    "Video unavailable",
    "Private video",
    "This video is private",
    "This video is not available",
    "removed by the uploader",
    "This video has been removed",
    "no longer available",
    "Sign in to confirm your age",
    "blocked it in your country",
    "Unsupported URL",
    "HTTP Error 403",
    "HTTP Error 404",
    "login required",
];

fn is_permanent_failure(stderr: &str) -> bool {
    PERMANENT_ERROR_PATTERNS
        .iter()
        .any(|pattern| stderr.contains(pattern))
}

/// Last `ERROR:` line of yt-dlp stderr, or its last non-empty line.
fn last_error_line(stderr: &str) -> String {
    let mut lines = stderr.lines().map(str::trim).filter(|l| !l.is_empty());
    let last = lines.clone().next_back().unwrap_or("yt-dlp exited with an error");
    lines
        .rfind(|l| l.starts_with("ERROR:"))
        .unwrap_or(last)
        .to_string()
}

#[derive(Debug, Deserialize)]
struct PrintedInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    filepath: Option<String>,
}

/// Parse the JSON line printed by [`PRINT_TEMPLATE`].
fn parse_printed_info(stdout: &str) -> Result<ExtractedMedia, ExtractError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|l| l.starts_with('{'))
        .ok_or(ExtractError::MissingOutput)?;

    let info: PrintedInfo = serde_json::from_str(line)
        .map_err(|e| ExtractError::MalformedOutput(format!("{e}: {line}")))?;

    let path = info
        .filepath
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .ok_or(ExtractError::MissingOutput)?;

    let title = info
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Ok(ExtractedMedia { path, title })
}

/// Extraction adapter backed by the yt-dlp command line tool
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    binary: String,
    format: String,
    output_template: String,
    user_agent: String,
    headers: Vec<(String, String)>,
    youtube_player_client: String,
    timeout: Option<Duration>,
}

impl YtDlpExtractor {
    /// Create an extractor from download settings.
    #[must_use]
    pub fn new(settings: &DownloadSettings) -> Self {
        Self {
            binary: settings.ytdlp_path.clone(),
            format: settings.format_selector(),
            output_template: settings.output_template.clone(),
            user_agent: settings.user_agent.clone(),
            headers: settings.headers(),
            youtube_player_client: settings.youtube_player_client.clone(),
            timeout: settings.extraction_timeout(),
        }
    }

    /// Command line arguments for one download.
    #[must_use]
    pub fn build_args(&self, url: &str, target_dir: &Path) -> Vec<String> {
        let output = target_dir.join(&self.output_template);

        let mut args = vec![
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            "--user-agent".to_string(),
            self.user_agent.clone(),
        ];

        for (name, value) in &self.headers {
            args.push("--add-header".to_string());
            args.push(format!("{name}:{value}"));
        }

        match classify(url) {
            Some(Platform::YouTube) if !self.youtube_player_client.is_empty() => {
                args.push("--extractor-args".to_string());
                args.push(format!(
                    "youtube:player_client={}",
                    self.youtube_player_client
                ));
            }
            Some(Platform::TikTok) => {
                args.push("--referer".to_string());
                args.push("https://www.tiktok.com/".to_string());
            }
            _ => {}
        }

        args.extend([
            "--no-simulate".to_string(),
            "--print".to_string(),
            PRINT_TEMPLATE.to_string(),
            "--".to_string(),
            url.to_string(),
        ]);
        args
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract(&self, url: &str, target_dir: &Path) -> Result<ExtractedMedia, ExtractError> {
        let args = self.build_args(url, target_dir);
        debug!(binary = %self.binary, ?args, "Executing yt-dlp command");

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ExtractError::Spawn)?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ExtractError::TimedOut(limit))?,
            None => child.wait_with_output().await,
        }
        .map_err(ExtractError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = last_error_line(&stderr);
            if is_permanent_failure(&stderr) {
                info!(
                    status = ?output.status.code(),
                    error = %reason,
                    "Content is not available on the platform"
                );
            } else {
                warn!(
                    status = ?output.status.code(),
                    error = %reason,
                    "yt-dlp reported failure"
                );
            }
            return Err(ExtractError::Unavailable(reason));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let media = parse_printed_info(&stdout)?;
        debug!(path = %media.path.display(), title = %media.title, "yt-dlp finished");
        Ok(media)
    }
}
