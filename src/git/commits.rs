//! Commit operations for WorkingCopy
//!
//! Contains methods for staging, committing and reading history

use git2::{Commit, ErrorCode, IndexAddOption, Signature};

use crate::git::error::{WorkingCopyError, WorkingCopyResult};
use crate::git::types::CommitInfo;
use crate::git::WorkingCopy;

impl WorkingCopy {
    /// Stage every new, modified and deleted file under the repository root
    pub fn stage_all(&self) -> WorkingCopyResult<()> {
        let repo = self.repo()?;
        let mut index = repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        // add_all does not record removals
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    }

    /// Create a commit from the staged tree.
    ///
    /// The committer is the author. Fails with
    /// [`WorkingCopyError::NothingToCommit`] when the index matches HEAD.
    pub fn commit(
        &self,
        message: &str,
        author_name: &str,
        author_email: &str,
    ) -> WorkingCopyResult<CommitInfo> {
        let repo = self.repo()?;
        let signature = Signature::now(author_name, author_email)?;

        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };

        let unchanged = match &parent {
            Some(parent) => parent.tree_id() == tree_id,
            None => index.is_empty(),
        };
        if unchanged {
            return Err(WorkingCopyError::NothingToCommit);
        }

        let tree = repo.find_tree(tree_id)?;
        let parents: Vec<&Commit> = parent.iter().collect();
        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        let commit = repo.find_commit(oid)?;
        log::info!("[WorkingCopy] Created commit {}", oid);
        Ok(commit_to_info(&commit))
    }

    /// Newest-first history of HEAD, at most `max_count` entries.
    ///
    /// An unborn branch has no history and yields an empty list.
    pub fn log(&self, max_count: usize) -> WorkingCopyResult<Vec<CommitInfo>> {
        let repo = self.repo()?;

        let mut revwalk = repo.revwalk()?;
        match revwalk.push_head() {
            Ok(()) => {}
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(e.into()),
        }

        let mut result = Vec::new();
        for oid in revwalk.take(max_count) {
            let commit = repo.find_commit(oid?)?;
            result.push(commit_to_info(&commit));
        }

        Ok(result)
    }
}

/// Convert a Commit to CommitInfo
pub(crate) fn commit_to_info(commit: &Commit) -> CommitInfo {
    let author = commit.author();
    let id = commit.id().to_string();

    CommitInfo {
        short_id: id[..7].to_string(),
        id,
        message: commit.message().unwrap_or("").to_string(),
        author: author.name().unwrap_or("").to_string(),
        email: author.email().unwrap_or("").to_string(),
        timestamp: commit.time().seconds(),
        parent_ids: commit.parent_ids().map(|oid| oid.to_string()).collect(),
    }
}
