//! Download directory handling
//!
//! Each delivery downloads into a [`RequestWorkspace`]. With isolation
//! enabled the workspace is a fresh `download_dir/<uuid>` directory that is
//! removed as a whole afterwards; otherwise it is the shared download
//! directory itself and only the produced file is removed.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Remove a file, treating "already gone" as success.
///
/// Returns `Ok(true)` if a file was removed and `Ok(false)` if it did not exist.
///
/// # Errors
///
/// Returns any I/O error other than `NotFound`.
pub async fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Make sure the base download directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub async fn ensure_download_dir(path: &Path) -> io::Result<()> {
    tokio::fs::create_dir_all(path).await
}

/// Directory a single delivery downloads into
#[derive(Debug)]
pub struct RequestWorkspace {
    dir: PathBuf,
    isolated: bool,
}

impl RequestWorkspace {
    /// Prepare the workspace under `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn create(base: &Path, isolated: bool) -> io::Result<Self> {
        let dir = if isolated {
            base.join(Uuid::new_v4().simple().to_string())
        } else {
            base.to_path_buf()
        };
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), isolated, "Prepared request workspace");
        Ok(Self { dir, isolated })
    }

    /// Directory the extractor should write into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the workspace is private to one request.
    #[must_use]
    pub const fn is_isolated(&self) -> bool {
        self.isolated
    }

    /// Remove the per-request directory and anything left in it.
    ///
    /// Shared workspaces are left untouched. Failures are logged, never returned.
    pub async fn release(self) {
        if !self.isolated {
            return;
        }
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => debug!(dir = %self.dir.display(), "Removed request workspace"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "Failed to remove request workspace"),
        }
    }
}
