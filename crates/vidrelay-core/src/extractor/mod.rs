//! Media extraction adapters
//!
//! The delivery workflow only knows the [`MediaExtractor`] trait; the
//! production implementation shells out to yt-dlp.

mod ytdlp;

pub use ytdlp::YtDlpExtractor;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors reported by an extraction adapter
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The engine could not fetch the resource
    #[error("Extraction failed: {0}")]
    Unavailable(String),
    /// The engine finished without reporting an output file
    #[error("Extraction produced no output file")]
    MissingOutput,
    /// The engine process could not be started
    #[error("Failed to launch extractor: {0}")]
    Spawn(#[source] std::io::Error),
    /// The engine output could not be understood
    #[error("Unexpected extractor output: {0}")]
    MalformedOutput(String),
    /// The engine exceeded the configured time limit
    #[error("Extraction timed out after {0:?}")]
    TimedOut(Duration),
}

impl ExtractError {
    /// Short fault category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "Unavailable",
            Self::MissingOutput => "MissingOutput",
            Self::Spawn(_) => "Spawn",
            Self::MalformedOutput(_) => "MalformedOutput",
            Self::TimedOut(_) => "Timeout",
        }
    }
}

/// A file written by the extraction engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMedia {
    /// Local path of the downloaded file
    pub path: PathBuf,
    /// Display title reported by the source platform
    pub title: String,
}

/// Resolves a URL to a local media file
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Download `url` into `target_dir` and report what was written.
    async fn extract(&self, url: &str, target_dir: &Path) -> Result<ExtractedMedia, ExtractError>;
}
