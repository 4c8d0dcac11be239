//! Error types for flagsync-remote.

use thiserror::Error;

/// All errors that can arise from remote-config operations.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Could not mint an access token.
    #[error("auth failed: {reason}")]
    Auth { reason: String },

    /// Template fetch failed (network, HTTP status, missing version header).
    #[error("template fetch failed: {reason}")]
    Fetch { reason: String },

    /// Template publish failed for a reason other than a version conflict.
    #[error("template publish failed: {reason}")]
    Publish { reason: String },

    /// The remote template changed between fetch and publish. The run must
    /// be retried from the fetch stage; nothing was applied.
    #[error("remote template version conflict: expected {expected}, live version is {actual}; re-run to retry")]
    VersionConflict { expected: String, actual: String },

    /// A single-target operation referenced a parameter that does not exist.
    #[error("parameter '{key}' not found in remote template")]
    NotFound { key: String },

    /// Template payload serialization/deserialization error.
    #[error("template JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
