//! Delivery error taxonomy
//!
//! Every fault inside one delivery is folded into a [`DeliveryError`] and
//! reported to the user according to its [`FailureKind`].

use crate::extractor::ExtractError;
use std::path::PathBuf;
use thiserror::Error;

/// User-distinguishable failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The engine could not fetch the resource (unavailable, removed, private)
    Extraction,
    /// The engine reported success but the output file is missing
    MissingOutput,
    /// Anything else; carries the fault category shown to the user
    Unclassified(&'static str),
}

/// Errors that can occur while delivering one video
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Failure reported by the extraction adapter
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// The reported output path does not exist
    #[error("Output file missing: {}", .0.display())]
    MissingFile(PathBuf),
    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The transport rejected the video upload
    #[error("Upload error: {0}")]
    Upload(String),
}

impl DeliveryError {
    /// Failure class used to pick the user-facing description.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Extract(ExtractError::Unavailable(_)) => FailureKind::Extraction,
            Self::Extract(ExtractError::MissingOutput) | Self::MissingFile(_) => {
                FailureKind::MissingOutput
            }
            _ => FailureKind::Unclassified(self.category()),
        }
    }

    /// Short fault category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Extract(e) => e.category(),
            Self::MissingFile(_) => "MissingFile",
            Self::Io(_) => "Io",
            Self::Upload(_) => "Upload",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_failure_kinds() {
        let unavailable = DeliveryError::from(ExtractError::Unavailable("Private video".into()));
        assert_eq!(unavailable.kind(), FailureKind::Extraction);

        let missing = DeliveryError::from(ExtractError::MissingOutput);
        assert_eq!(missing.kind(), FailureKind::MissingOutput);

        let missing_file = DeliveryError::MissingFile(PathBuf::from("downloads/x.mp4"));
        assert_eq!(missing_file.kind(), FailureKind::MissingOutput);
    }

    #[test]
    fn test_unclassified_categories() {
        let io = DeliveryError::from(std::io::Error::other("disk full"));
        assert_eq!(io.kind(), FailureKind::Unclassified("Io"));

        let upload = DeliveryError::Upload("Request Entity Too Large".into());
        assert_eq!(upload.kind(), FailureKind::Unclassified("Upload"));

        let timeout = DeliveryError::from(ExtractError::TimedOut(Duration::from_secs(5)));
        assert_eq!(timeout.kind(), FailureKind::Unclassified("Timeout"));

        let malformed = DeliveryError::from(ExtractError::MalformedOutput("???".into()));
        assert_eq!(malformed.kind(), FailureKind::Unclassified("MalformedOutput"));
    }
}
