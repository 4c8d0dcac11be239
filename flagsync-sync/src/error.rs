//! Error types for flagsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use flagsync_core::error::ConfigError;
use flagsync_docs::error::DocError;
use flagsync_remote::error::RemoteError;

use crate::tracker::TrackerError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the workspace config.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An error from document parsing or storage.
    #[error("document error: {0}")]
    Doc(#[from] DocError),

    /// An error from the remote-config service.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// An error from the issue tracker / git collaborator.
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every scanned document failed to parse. Individual parse failures are
    /// per-document warnings; a run where nothing parsed is fatal.
    #[error("all {failures} scanned documents failed to parse")]
    AllDocumentsFailed { failures: usize },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
