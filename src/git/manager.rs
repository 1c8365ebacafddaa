//! Core WorkingCopy implementation
//!
//! Contains the WorkingCopy struct, repository discovery, initialization,
//! cloning and release of the underlying handle

use git2::build::RepoBuilder;
use git2::{FetchOptions, Repository, RepositoryInitOptions};
use std::fs;
use std::path::{Path, PathBuf};

use crate::git::error::{WorkingCopyError, WorkingCopyResult};
use crate::git::remote::remote_callbacks;
use crate::git::types::Credentials;

/// Handle bound to exactly one on-disk working directory.
///
/// The handle is released when dropped or when [`WorkingCopy::close`] is
/// called; every primitive called afterwards fails with
/// [`WorkingCopyError::Closed`].
pub struct WorkingCopy {
    workdir: PathBuf,
    repo: Option<Repository>,
}

impl WorkingCopy {
    /// Bind to `path`, creating the directory and an empty repository as needed.
    ///
    /// A directory that is already inside a repository is opened as-is. A fresh
    /// repository gets `initial_branch` as its unborn HEAD when one is given.
    pub fn open_or_init<P: AsRef<Path>>(
        path: P,
        initial_branch: Option<&str>,
    ) -> WorkingCopyResult<Self> {
        let workdir = path.as_ref().to_path_buf();
        let init_error = |message: String| WorkingCopyError::Init {
            path: workdir.clone(),
            message,
        };

        if !workdir.exists() {
            fs::create_dir_all(&workdir).map_err(|e| init_error(e.to_string()))?;
            log::debug!("[WorkingCopy] Created directory {}", workdir.display());
        }

        let repo = if Self::is_repository(&workdir) {
            Repository::discover(&workdir).map_err(|e| init_error(e.message().to_string()))?
        } else {
            let mut opts = RepositoryInitOptions::new();
            if let Some(branch) = initial_branch.filter(|b| !b.trim().is_empty()) {
                opts.initial_head(branch);
            }
            let repo = Repository::init_opts(&workdir, &opts)
                .map_err(|e| init_error(e.message().to_string()))?;
            log::info!("[WorkingCopy] Initialized repository at {}", workdir.display());
            repo
        };

        Ok(Self {
            workdir,
            repo: Some(repo),
        })
    }

    /// Clone `url` into `path` and bind to the result
    pub fn clone_repository<P: AsRef<Path>>(
        url: &str,
        path: P,
        credentials: Option<&Credentials>,
    ) -> WorkingCopyResult<Self> {
        let workdir = path.as_ref().to_path_buf();

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(credentials));

        let repo = RepoBuilder::new()
            .fetch_options(fetch_options)
            .clone(url, &workdir)?;

        log::info!("[WorkingCopy] Cloned {} into {}", url, workdir.display());
        Ok(Self {
            workdir,
            repo: Some(repo),
        })
    }

    /// True iff a repository is discoverable from `path` or one of its parents.
    ///
    /// Never fails: unreadable or missing paths report `false`.
    pub fn is_repository<P: AsRef<Path>>(path: P) -> bool {
        Repository::discover(path.as_ref()).is_ok()
    }

    /// The working directory this handle was bound to
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Release the underlying repository handle. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.repo.take().is_some() {
            log::debug!("[WorkingCopy] Closed {}", self.workdir.display());
        }
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.repo.is_none()
    }

    /// Get a reference to the underlying repository
    pub(crate) fn repo(&self) -> WorkingCopyResult<&Repository> {
        self.repo.as_ref().ok_or(WorkingCopyError::Closed)
    }
}
