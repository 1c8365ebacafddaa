//! Caller-facing error taxonomy for repository operations

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::git::WorkingCopyError;

/// Coarse category reported to callers; internal detail stays in the logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    NotFound,
    NotARepository,
    InvalidArgument,
    VersionControlError,
    IoError,
    /// Not produced by repository operations; reserved for server faults
    InternalError,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not-found",
            ErrorCategory::NotARepository => "not-a-repository",
            ErrorCategory::InvalidArgument => "invalid-argument",
            ErrorCategory::VersionControlError => "version-control-error",
            ErrorCategory::IoError => "io-error",
            ErrorCategory::InternalError => "internal-error",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository {project_code}/{name} is not registered")]
    NotFound { project_code: String, name: String },

    #[error("repository path {0} does not exist")]
    PathMissing(PathBuf),

    #[error("file {0} not found")]
    FileNotFound(String),

    #[error("{0} is not a git repository")]
    NotARepository(PathBuf),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    VersionControl(WorkingCopyError),

    /// The local commit exists but never reached the remote
    #[error("commit {commit_id} on {branch} was not published")]
    PublishFailed {
        commit_id: String,
        branch: String,
        #[source]
        source: WorkingCopyError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RepositoryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RepositoryError::NotFound { .. }
            | RepositoryError::PathMissing(_)
            | RepositoryError::FileNotFound(_) => ErrorCategory::NotFound,
            RepositoryError::NotARepository(_) => ErrorCategory::NotARepository,
            RepositoryError::InvalidArgument(_) => ErrorCategory::InvalidArgument,
            RepositoryError::VersionControl(_) | RepositoryError::PublishFailed { .. } => {
                ErrorCategory::VersionControlError
            }
            RepositoryError::Io(_) => ErrorCategory::IoError,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        RepositoryError::InvalidArgument(message.into())
    }
}

impl From<WorkingCopyError> for RepositoryError {
    fn from(err: WorkingCopyError) -> Self {
        match err {
            WorkingCopyError::Io(e) => RepositoryError::Io(e),
            other => RepositoryError::VersionControl(other),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
