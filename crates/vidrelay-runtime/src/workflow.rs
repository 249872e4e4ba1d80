//! Delivery workflow
//!
//! `Received → Validated → Extracting → SizeChecked → Uploading → Completed`,
//! with `Errored` reachable from every non-terminal state and `Rejected`
//! for input that is not a supported link. One status
//! message per request: sent once, edited while downloading and uploading,
//! then deleted on success or rewritten with the terminal text.
//!
//! Every file the extractor reports is removed before [`DeliveryWorkflow::run`]
//! returns, whatever the outcome.

use crate::texts;
use crate::transport::{ChatTransport, StatusHandle};
use anyhow::Result;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vidrelay_core::config::DownloadSettings;
use vidrelay_core::fs::{remove_file_if_exists, RequestWorkspace};
use vidrelay_core::utils::truncate_str;
use vidrelay_core::{classify, DeliveryError, FailureKind, MediaExtractor, Platform};

/// A video link received from a chat user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// Raw message text
    pub url: String,
    /// Originating chat
    pub chat_id: i64,
    /// Originating message
    pub message_id: i32,
    /// Sender, 0 when unknown
    pub user_id: i64,
}

/// Workflow states, used for logging transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    /// Message received
    Received,
    /// URL recognised
    Validated,
    /// Extractor running
    Extracting,
    /// Output file measured and within the ceiling
    SizeChecked,
    /// Video upload in progress
    Uploading,
    /// Video delivered, status removed
    Completed,
    /// Terminal failure
    Errored,
    /// Input was not a supported link
    Rejected,
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Input was not a supported link; a rejection reply was sent
    Rejected,
    /// The file exceeded the upload ceiling
    TooLarge {
        /// Measured size in bytes
        size: u64,
    },
    /// The video was delivered
    Completed {
        /// Caption title
        title: String,
        /// Uploaded size in bytes
        size: u64,
    },
    /// The request failed; the status message describes why
    Failed(FailureKind),
}

/// Orchestrates one video delivery per call to [`run`](Self::run).
///
/// Holds no per-request state, so a single instance can serve concurrent
/// requests from different chats.
pub struct DeliveryWorkflow<E> {
    extractor: E,
    settings: Arc<DownloadSettings>,
}

impl<E: MediaExtractor> DeliveryWorkflow<E> {
    /// Create a workflow around an extractor.
    pub const fn new(extractor: E, settings: Arc<DownloadSettings>) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    /// Handle one request end to end.
    ///
    /// Extraction, size-check and upload faults are reported to the user and
    /// returned as [`DeliveryOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the rejection reply or the initial status
    /// message cannot be sent.
    pub async fn run<T>(&self, transport: &T, request: &DeliveryRequest) -> Result<DeliveryOutcome>
    where
        T: ChatTransport + ?Sized,
    {
        let url = request.url.trim();
        trace_state(request, DeliveryState::Received, None);

        let Some(platform) = classify(url) else {
            trace_state(request, DeliveryState::Rejected, None);
            info!(
                chat_id = request.chat_id,
                user_id = request.user_id,
                text = %truncate_str(url, 100),
                "Rejected unsupported link"
            );
            transport.reply_text(texts::UNSUPPORTED_URL).await?;
            return Ok(DeliveryOutcome::Rejected);
        };
        trace_state(request, DeliveryState::Validated, Some(platform));

        let status = transport.reply_text(texts::STATUS_STARTING).await?;

        let base = &self.settings.download_dir;
        let workspace = match RequestWorkspace::create(base, self.settings.download_isolation).await {
            Ok(ws) => ws,
            Err(e) => {
                let err = DeliveryError::Io(e);
                return Ok(self.fail(transport, status, request, &err).await);
            }
        };

        let attempt = Attempt {
            request,
            platform,
            url,
            status,
        };
        let mut produced: Option<PathBuf> = None;
        let result = self
            .deliver(transport, &attempt, workspace.dir(), &mut produced)
            .await;

        // Single removal point for the downloaded file
        if let Some(path) = produced.take() {
            if let Err(e) = remove_file_if_exists(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove downloaded file");
            }
        }
        workspace.release().await;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(err) => Ok(self.fail(transport, status, request, &err).await),
        }
    }

    async fn deliver<T>(
        &self,
        transport: &T,
        attempt: &Attempt<'_>,
        target_dir: &Path,
        produced: &mut Option<PathBuf>,
    ) -> Result<DeliveryOutcome, DeliveryError>
    where
        T: ChatTransport + ?Sized,
    {
        let Attempt {
            request,
            platform,
            url,
            status,
        } = *attempt;
        update_status(transport, status, texts::STATUS_DOWNLOADING).await;
        trace_state(request, DeliveryState::Extracting, Some(platform));

        let media = self.extractor.extract(url, target_dir).await?;
        *produced = Some(media.path.clone());

        let size = match tokio::fs::metadata(&media.path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DeliveryError::MissingFile(media.path));
            }
            Err(e) => return Err(e.into()),
        };

        let limit = self.settings.max_upload_bytes;
        if size > limit {
            info!(
                chat_id = request.chat_id,
                size,
                limit,
                "Video exceeds upload limit, not sending"
            );
            update_status(transport, status, &texts::too_large(size, limit)).await;
            return Ok(DeliveryOutcome::TooLarge { size });
        }
        trace_state(request, DeliveryState::SizeChecked, Some(platform));

        update_status(transport, status, texts::STATUS_UPLOADING).await;
        trace_state(request, DeliveryState::Uploading, Some(platform));

        transport
            .reply_video(&media.path, &texts::caption(&media.title))
            .await
            .map_err(|e| DeliveryError::Upload(e.to_string()))?;

        if let Err(e) = transport.delete_message(status).await {
            warn!(chat_id = request.chat_id, error = %e, "Failed to delete status message");
        }
        trace_state(request, DeliveryState::Completed, Some(platform));
        info!(chat_id = request.chat_id, size, title = %media.title, "Video delivered");

        Ok(DeliveryOutcome::Completed {
            title: media.title,
            size,
        })
    }

    async fn fail<T>(
        &self,
        transport: &T,
        status: StatusHandle,
        request: &DeliveryRequest,
        err: &DeliveryError,
    ) -> DeliveryOutcome
    where
        T: ChatTransport + ?Sized,
    {
        let kind = err.kind();
        error!(
            chat_id = request.chat_id,
            user_id = request.user_id,
            url = %truncate_str(&request.url, 200),
            category = err.category(),
            error = %err,
            "Video delivery failed"
        );
        trace_state(request, DeliveryState::Errored, None);
        update_status(transport, status, &texts::failure(kind)).await;
        DeliveryOutcome::Failed(kind)
    }
}

/// Per-request values threaded through the delivery steps
#[derive(Clone, Copy)]
struct Attempt<'a> {
    request: &'a DeliveryRequest,
    platform: Platform,
    url: &'a str,
    status: StatusHandle,
}

/// Best-effort status edit; a failed edit never aborts the request.
async fn update_status<T>(transport: &T, status: StatusHandle, text: &str)
where
    T: ChatTransport + ?Sized,
{
    if let Err(e) = transport.edit_text(status, text).await {
        warn!(message_id = status.0, error = %e, "Failed to update status message");
    }
}

fn trace_state(request: &DeliveryRequest, state: DeliveryState, platform: Option<Platform>) {
    debug!(
        chat_id = request.chat_id,
        message_id = request.message_id,
        platform = platform.map(Platform::display_name),
        %state,
        "Delivery state"
    );
}
