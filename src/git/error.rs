//! Error type for working copy operations

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by [`WorkingCopy`](crate::git::WorkingCopy) primitives.
///
/// The underlying git2 and filesystem errors are carried through unchanged so
/// callers can log the exact tool message.
#[derive(Debug, Error)]
pub enum WorkingCopyError {
    #[error("failed to initialize repository at {}: {message}", path.display())]
    Init { path: PathBuf, message: String },

    #[error("working copy has already been closed")]
    Closed,

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("branch '{0}' already exists")]
    BranchExists(String),

    #[error("nothing staged to commit")]
    NothingToCommit,

    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    #[error("push of {refname} rejected: {reason}")]
    PushRejected { refname: String, reason: String },

    #[error("cannot fast-forward '{0}' to the fetched remote state")]
    NonFastForward(String),

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for working copy operations
pub type WorkingCopyResult<T> = Result<T, WorkingCopyError>;
