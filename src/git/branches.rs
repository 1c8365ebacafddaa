//! Branch operations for WorkingCopy
//!
//! Contains methods for creating, listing and checking out branches

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, ObjectType};

use crate::git::error::{WorkingCopyError, WorkingCopyResult};
use crate::git::types::LOCAL_BRANCH_PREFIX;
use crate::git::WorkingCopy;

impl WorkingCopy {
    /// Create a new local branch pointing at the current HEAD.
    ///
    /// Fails when the branch already exists locally or HEAD has no commit yet.
    pub fn create_branch(&self, name: &str, checkout: bool) -> WorkingCopyResult<()> {
        let repo = self.repo()?;

        if repo.find_branch(name, BranchType::Local).is_ok() {
            return Err(WorkingCopyError::BranchExists(name.to_string()));
        }

        let head_commit = repo.head()?.peel_to_commit()?;
        repo.branch(name, &head_commit, false)?;
        log::debug!(
            "[WorkingCopy] Created branch {} at {}",
            name,
            head_commit.id()
        );

        if checkout {
            self.checkout(name)?;
        }

        Ok(())
    }

    /// Switch the working tree and HEAD to an existing local branch.
    ///
    /// Accepts either the short name or `refs/heads/<name>`. Never creates the
    /// branch.
    pub fn checkout(&self, name: &str) -> WorkingCopyResult<()> {
        let repo = self.repo()?;
        let short_name = name.strip_prefix(LOCAL_BRANCH_PREFIX).unwrap_or(name);

        let branch = repo
            .find_branch(short_name, BranchType::Local)
            .map_err(|e| match e.code() {
                ErrorCode::NotFound | ErrorCode::InvalidSpec => {
                    WorkingCopyError::BranchNotFound(short_name.to_string())
                }
                _ => WorkingCopyError::Git(e),
            })?;

        let target = branch.get().peel(ObjectType::Commit)?;
        let mut opts = CheckoutBuilder::new();
        opts.safe();
        repo.checkout_tree(&target, Some(&mut opts))?;
        repo.set_head(&format!("{}{}", LOCAL_BRANCH_PREFIX, short_name))?;

        log::debug!("[WorkingCopy] Checked out {}", short_name);
        Ok(())
    }

    /// Fully qualified names of every local and remote-tracking branch.
    ///
    /// Order is whatever libgit2 yields.
    pub fn list_branches(&self) -> WorkingCopyResult<Vec<String>> {
        let repo = self.repo()?;

        let mut result = Vec::new();
        for branch in repo.branches(None)? {
            let (branch, _) = branch?;
            if let Some(name) = branch.get().name() {
                result.push(name.to_string());
            }
        }

        Ok(result)
    }

    /// Short name of the branch HEAD points at.
    ///
    /// A freshly initialized repository reports its unborn branch. Detached
    /// HEAD yields `None`.
    pub fn current_branch(&self) -> WorkingCopyResult<Option<String>> {
        let repo = self.repo()?;

        match repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(|s| s.to_string())),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = repo.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .and_then(|target| target.strip_prefix(LOCAL_BRANCH_PREFIX))
                    .map(|s| s.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
