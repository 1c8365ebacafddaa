//! RepositoryManager: caller-facing use cases built from WorkingCopy primitives
//!
//! Every operation binds a fresh WorkingCopy to the descriptor's path, holds
//! that path's lock for its whole duration and closes the handle on the way
//! out, whatever the outcome.

use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::config::{RepositoryDescriptor, RepositoryRegistry};
use crate::git::{
    WorkingCopy, WorkingCopyError, GIT_DIR, LOCAL_BRANCH_PREFIX, REMOTE_BRANCH_PREFIX,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::locks::RepositoryLocks;
use crate::repository::types::{CommitReceipt, FileCommitIntent};
use crate::utils::{is_blank, is_strictly_within, lock_mutex_recover, non_blank, normalize_path};

/// Strip a local or remote-tracking prefix from a branch name
pub fn normalize_branch_name(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix(LOCAL_BRANCH_PREFIX)
        .or_else(|| name.strip_prefix(REMOTE_BRANCH_PREFIX))
        .unwrap_or(name)
}

/// Requested branch if given, else the descriptor's main branch, normalized
fn resolve_branch<'a>(
    requested: Option<&'a str>,
    descriptor: &'a RepositoryDescriptor,
) -> Option<&'a str> {
    non_blank(requested)
        .or_else(|| non_blank(Some(descriptor.main_branch.as_str())))
        .map(normalize_branch_name)
}

/// Check out `branch` unless HEAD already sits on it
fn switch_to(working_copy: &WorkingCopy, branch: &str) -> RepositoryResult<()> {
    if working_copy.current_branch()?.as_deref() == Some(branch) {
        return Ok(());
    }
    working_copy.checkout(branch)?;
    Ok(())
}

/// Destination of an uploaded file, confined to the working tree.
///
/// The joined path is normalized lexically; anything that escapes `root` or
/// lands in the metadata directory is rejected.
fn resolve_destination(root: &Path, file_name: &str) -> RepositoryResult<PathBuf> {
    let root = normalize_path(root);
    let destination = normalize_path(&root.join(file_name));

    if !is_strictly_within(&root, &destination) {
        return Err(RepositoryError::invalid(format!(
            "file name '{}' resolves outside the repository",
            file_name
        )));
    }

    if inside_metadata(&root, &destination) {
        return Err(RepositoryError::invalid(format!(
            "file name '{}' targets repository metadata",
            file_name
        )));
    }

    Ok(destination)
}

fn inside_metadata(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .ok()
        .and_then(|relative| relative.components().next())
        .is_some_and(|first| first == Component::Normal(OsStr::new(GIT_DIR)))
}

/// Follow symlinks already on disk along `destination` and require the
/// deepest existing entry to stay inside `root` and outside the metadata
/// directory.
fn ensure_resolves_inside(root: &Path, destination: &Path) -> RepositoryResult<()> {
    let root = fs::canonicalize(root)?;
    let Some(existing) = destination
        .ancestors()
        .find(|path| fs::symlink_metadata(path).is_ok())
    else {
        return Ok(());
    };

    let escapes = |resolved: &Path| {
        (resolved != root.as_path() && !is_strictly_within(&root, resolved))
            || inside_metadata(&root, resolved)
    };
    match fs::canonicalize(existing) {
        Ok(resolved) if !escapes(&resolved) => Ok(()),
        _ => Err(RepositoryError::invalid(format!(
            "'{}' resolves outside the repository through a symbolic link",
            destination.display()
        ))),
    }
}

/// Orchestrates repository operations for registered repositories
#[derive(Clone)]
pub struct RepositoryManager {
    registry: Arc<RepositoryRegistry>,
    locks: Arc<RepositoryLocks>,
}

impl RepositoryManager {
    pub fn new(registry: Arc<RepositoryRegistry>) -> Self {
        Self {
            registry,
            locks: Arc::new(RepositoryLocks::new()),
        }
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    /// Descriptor registered under `(project_code, name)`
    pub fn descriptor(&self, project_code: &str, name: &str) -> RepositoryResult<RepositoryDescriptor> {
        self.registry
            .find_by_project_and_name(project_code, name)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                project_code: project_code.to_string(),
                name: name.to_string(),
            })
    }

    /// Fail unless the descriptor's path exists and is inside a repository
    pub fn ensure_repository_path(descriptor: &RepositoryDescriptor) -> RepositoryResult<()> {
        if !descriptor.path.exists() {
            return Err(RepositoryError::PathMissing(descriptor.path.clone()));
        }
        if !WorkingCopy::is_repository(&descriptor.path) {
            return Err(RepositoryError::NotARepository(descriptor.path.clone()));
        }
        Ok(())
    }

    /// Fully qualified names of every local and remote-tracking branch
    pub fn list_branches(&self, descriptor: &RepositoryDescriptor) -> RepositoryResult<Vec<String>> {
        log::info!("[RepositoryManager] Listing branches of {}", descriptor.name);

        let branches = self.with_working_copy(descriptor, |wc| Ok(wc.list_branches()?))?;

        log::info!(
            "[RepositoryManager] Found {} branches in {}",
            branches.len(),
            descriptor.name
        );
        Ok(branches)
    }

    /// Create `branch_name` from `source_branch` (or main) and publish it.
    ///
    /// Safe to retry: an existing local branch is not recreated and an
    /// existing remote-tracking branch is not pushed again.
    pub fn create_branch(
        &self,
        branch_name: &str,
        source_branch: Option<&str>,
        descriptor: &RepositoryDescriptor,
    ) -> RepositoryResult<()> {
        if is_blank(branch_name) {
            return Err(RepositoryError::invalid("branch name must not be blank"));
        }
        let name = normalize_branch_name(branch_name);
        if name.is_empty() {
            return Err(RepositoryError::invalid(format!(
                "branch name '{}' has no name after its prefix",
                branch_name
            )));
        }

        log::info!(
            "[RepositoryManager] Creating branch {} in {}",
            name,
            descriptor.name
        );

        self.with_working_copy(descriptor, |wc| {
            if let Some(base) = resolve_branch(source_branch, descriptor) {
                wc.checkout(base)?;
            }

            let local_ref = format!("{}{}", LOCAL_BRANCH_PREFIX, name);
            if wc.list_branches()?.contains(&local_ref) {
                log::debug!("[RepositoryManager] {} already exists locally", local_ref);
            } else {
                wc.create_branch(name, false)?;
            }

            let remote_ref = format!("{}{}", REMOTE_BRANCH_PREFIX, name);
            if wc.list_branches()?.contains(&remote_ref) {
                log::debug!("[RepositoryManager] {} already present, not pushing", remote_ref);
            } else {
                wc.push_branch(name, descriptor.credentials().as_ref())?;
            }

            Ok(())
        })?;

        log::info!(
            "[RepositoryManager] Branch {} ready in {}",
            name,
            descriptor.name
        );
        Ok(())
    }

    /// Content of the first file named `file_name` on `branch` (or main)
    pub fn get_file(
        &self,
        file_name: &str,
        descriptor: &RepositoryDescriptor,
        branch: Option<&str>,
    ) -> RepositoryResult<Vec<u8>> {
        if is_blank(file_name) || file_name.contains(['/', '\\']) {
            return Err(RepositoryError::invalid(format!(
                "'{}' is not a plain file name",
                file_name
            )));
        }

        log::info!(
            "[RepositoryManager] Reading {} from {}",
            file_name,
            descriptor.name
        );

        let content = self.with_working_copy(descriptor, |wc| {
            if let Some(branch) = resolve_branch(branch, descriptor) {
                switch_to(wc, branch)?;
            }

            let path = wc
                .find_file_by_name(file_name)?
                .ok_or_else(|| RepositoryError::FileNotFound(file_name.to_string()))?;
            Ok(fs::read(path)?)
        })?;

        log::info!(
            "[RepositoryManager] Read {} bytes of {} from {}",
            content.len(),
            file_name,
            descriptor.name
        );
        Ok(content)
    }

    /// Write, commit and push one file.
    ///
    /// Success means the commit reached the remote. A failed push leaves the
    /// local commit in place and reports it through
    /// [`RepositoryError::PublishFailed`]; sending the same upload again
    /// pushes that pending commit instead of failing on an unchanged tree.
    pub fn commit_file(
        &self,
        intent: &FileCommitIntent,
        descriptor: &RepositoryDescriptor,
    ) -> RepositoryResult<CommitReceipt> {
        if intent.content.is_empty() {
            return Err(RepositoryError::invalid("uploaded file is empty"));
        }
        if is_blank(&intent.file_name) {
            return Err(RepositoryError::invalid("file name must not be blank"));
        }
        let branch = resolve_branch(intent.branch.as_deref(), descriptor)
            .ok_or_else(|| RepositoryError::invalid("no target branch"))?
            .to_string();
        let destination = resolve_destination(&descriptor.path, &intent.file_name)?;

        log::info!(
            "[RepositoryManager] Committing {} to {} in {}",
            intent.file_name,
            branch,
            descriptor.name
        );

        let receipt = self.with_working_copy(descriptor, |wc| {
            switch_to(wc, &branch)?;
            ensure_resolves_inside(&descriptor.path, &destination)?;

            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&destination, &intent.content)?;

            let message = non_blank(intent.message.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Update {}", intent.file_name));
            let author = non_blank(intent.author_name.as_deref())
                .unwrap_or(descriptor.default_commit_user.as_str());
            let email = non_blank(intent.author_email.as_deref())
                .unwrap_or(descriptor.default_commit_email.as_str());

            wc.stage_all()?;
            let commit = match wc.commit(&message, author, email) {
                Ok(commit) => commit,
                // Same upload again after a failed push: publish the pending commit
                Err(WorkingCopyError::NothingToCommit) => match wc.unpublished_commit(&branch)? {
                    Some(pending) => {
                        log::info!(
                            "[RepositoryManager] Retrying publication of {} on {}",
                            pending.id,
                            branch
                        );
                        pending
                    }
                    None => return Err(WorkingCopyError::NothingToCommit.into()),
                },
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = wc.push_branch(&branch, descriptor.credentials().as_ref()) {
                log::error!(
                    "[RepositoryManager] Commit {} on {} in {} is local only, push failed: {}",
                    commit.id,
                    branch,
                    descriptor.name,
                    e
                );
                return Err(RepositoryError::PublishFailed {
                    commit_id: commit.id,
                    branch: branch.clone(),
                    source: e,
                });
            }

            Ok(CommitReceipt {
                commit_id: commit.id,
                branch: branch.clone(),
            })
        })?;

        log::info!(
            "[RepositoryManager] Published {} as {} on {}",
            intent.file_name,
            receipt.commit_id,
            receipt.branch
        );
        Ok(receipt)
    }

    /// Immediate entries of the repository root on the main branch
    pub fn list_files(&self, descriptor: &RepositoryDescriptor) -> RepositoryResult<Vec<String>> {
        log::info!("[RepositoryManager] Listing files of {}", descriptor.name);

        let files = self.with_working_copy(descriptor, |wc| {
            if let Some(branch) = resolve_branch(None, descriptor) {
                switch_to(wc, branch)?;
            }
            Ok(wc.list_root_entries()?)
        })?;

        log::info!(
            "[RepositoryManager] Found {} entries in {}",
            files.len(),
            descriptor.name
        );
        Ok(files)
    }

    /// Clone the descriptor's remote into its path unless a repository is
    /// already there. Returns whether a clone happened.
    pub fn ensure_cloned(&self, descriptor: &RepositoryDescriptor) -> RepositoryResult<bool> {
        let lock = self.locks.for_path(&descriptor.path);
        let _guard = lock_mutex_recover(&lock);

        if WorkingCopy::is_repository(&descriptor.path) {
            log::debug!(
                "[RepositoryManager] {} already present at {}",
                descriptor.name,
                descriptor.path.display()
            );
            return Ok(false);
        }

        let url = non_blank(descriptor.remote_url.as_deref()).ok_or_else(|| {
            RepositoryError::invalid(format!("{} has no remote_url to clone", descriptor.name))
        })?;

        log::info!(
            "[RepositoryManager] Cloning {} into {}",
            descriptor.name,
            descriptor.path.display()
        );
        let mut working_copy = WorkingCopy::clone_repository(
            url,
            &descriptor.path,
            descriptor.credentials().as_ref(),
        )?;
        working_copy.close();

        Ok(true)
    }

    fn with_working_copy<T>(
        &self,
        descriptor: &RepositoryDescriptor,
        operation: impl FnOnce(&WorkingCopy) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        let lock = self.locks.for_path(&descriptor.path);
        let _guard = lock_mutex_recover(&lock);

        let mut working_copy = WorkingCopy::open_or_init(
            &descriptor.path,
            non_blank(Some(descriptor.main_branch.as_str())),
        )?;
        let result = operation(&working_copy);
        working_copy.close();

        if let Err(e) = &result {
            log::debug!(
                "[RepositoryManager] Operation on {} failed: {}",
                descriptor.name,
                e
            );
        }
        result
    }
}
