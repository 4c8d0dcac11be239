//! Error types for flagsync-docs.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from document parsing and storage.
#[derive(Debug, Error)]
pub enum DocError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Frontmatter opened but never closed, or a line that is neither a
    /// `key: value` pair nor a list item.
    #[error("malformed frontmatter: {reason}")]
    MalformedFrontmatter { reason: String },

    /// A patch was applied to a document with no frontmatter block.
    #[error("document has no frontmatter block to update")]
    FrontmatterAbsent,

    /// Flag block markers present but the table between them is invalid.
    #[error("malformed flag block: {reason}")]
    MalformedFlagBlock { reason: String },
}

/// Convenience constructor for [`DocError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DocError {
    DocError::Io {
        path: path.into(),
        source,
    }
}
