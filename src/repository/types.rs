//! Request and result types for repository operations

use serde::Serialize;

/// A file upload to be committed and published
#[derive(Debug, Clone, Default)]
pub struct FileCommitIntent {
    /// Name as uploaded; may contain subdirectories relative to the root
    pub file_name: String,
    pub content: Vec<u8>,
    /// Falls back to the descriptor's main branch
    pub branch: Option<String>,
    pub message: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl FileCommitIntent {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self.author_email = Some(email.into());
        self
    }
}

/// A commit that exists both locally and on the remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub commit_id: String,
    pub branch: String,
}
