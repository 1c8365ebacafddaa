// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::needless_borrow)] // Explicit borrows can clarify ownership
#![allow(clippy::redundant_closure)] // |x| f(x) can be clearer than f

// Module declarations
pub mod config;
pub mod git;
pub mod repository;
pub mod shutdown;
mod utils;

// Server module (HTTP API)
pub mod server;

pub use config::{RepositoryDescriptor, RepositoryRegistry};
pub use git::{WorkingCopy, WorkingCopyError};
pub use repository::{
    CommitReceipt, ErrorCategory, FileCommitIntent, RepositoryError, RepositoryManager,
};
