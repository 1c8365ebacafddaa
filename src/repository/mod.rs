//! Repository use cases on top of the git working copy layer
//!
//! - `manager`: RepositoryManager operations (branches, files, commits)
//! - `error`: caller-facing error taxonomy
//! - `locks`: per-path serialization of working tree access
//! - `types`: commit intents and receipts

mod error;
mod locks;
mod manager;
#[cfg(test)]
mod tests;
mod types;

pub use error::{ErrorCategory, RepositoryError, RepositoryResult};
pub use locks::RepositoryLocks;
pub use manager::{normalize_branch_name, RepositoryManager};
pub use types::{CommitReceipt, FileCommitIntent};
