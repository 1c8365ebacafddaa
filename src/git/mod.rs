//! Git operations using git2-rs
//!
//! This module provides the working copy primitives organized into focused submodules:
//! - `manager` - Core WorkingCopy struct, discovery, init, clone and release
//! - `branches` - Branch operations (create, list, checkout, current)
//! - `commits` - Commit operations (stage, commit, history)
//! - `remote` - Push, pull and credential callbacks
//! - `status` - Working directory status
//! - `files` - File lookups inside the working directory
//! - `types` - Shared data structures
//! - `error` - Failure type shared by all primitives

// Submodules
mod branches;
mod commits;
mod error;
mod files;
mod manager;
mod remote;
mod status;
mod types;

// Re-export the main WorkingCopy struct
pub use manager::WorkingCopy;

pub use error::{WorkingCopyError, WorkingCopyResult};
pub use files::GIT_DIR;
pub use types::{
    CommitInfo, Credentials, StatusSummary, DEFAULT_REMOTE, LOCAL_BRANCH_PREFIX,
    REMOTE_BRANCH_PREFIX,
};
