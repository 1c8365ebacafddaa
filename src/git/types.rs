//! Git data types and structures
//!
//! Contains the shared types used across working copy operations

use serde::{Deserialize, Serialize};

/// Fully qualified prefix of local branch references
pub const LOCAL_BRANCH_PREFIX: &str = "refs/heads/";

/// Fully qualified prefix of remote-tracking references for `origin`
pub const REMOTE_BRANCH_PREFIX: &str = "refs/remotes/origin/";

/// Name of the remote every push and pull talks to
pub const DEFAULT_REMOTE: &str = "origin";

/// Authentication presented to the remote during push, pull and clone
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    UserPass { username: String, password: String },
    /// Personal access token, sent as the password
    Token(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::UserPass { username, .. } => f
                .debug_struct("UserPass")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
        }
    }
}

/// Snapshot of working directory changes relative to the index and HEAD
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// New files staged in the index
    pub added: Vec<String>,
    pub modified: Vec<String>,
    /// Files present on disk but unknown to the index
    pub untracked: Vec<String>,
    pub deleted: Vec<String>,
}

impl StatusSummary {
    /// True when nothing differs from HEAD
    #[cfg(test)]
    pub fn is_clean(&self) -> bool {
        self.added.is_empty()
            && self.modified.is_empty()
            && self.untracked.is_empty()
            && self.deleted.is_empty()
    }
}

/// Represents a git commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub id: String,
    pub short_id: String,
    pub message: String,
    pub author: String,
    pub email: String,
    pub timestamp: i64,
    pub parent_ids: Vec<String>,
}
