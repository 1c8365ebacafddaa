//! Remote operations for WorkingCopy
//!
//! Push, pull and the credential callbacks shared with clone

use git2::build::CheckoutBuilder;
use git2::{
    BranchType, Cred, CredentialType, ErrorCode, FetchOptions, PushOptions, RemoteCallbacks,
};

use crate::git::commits::commit_to_info;
use crate::git::error::{WorkingCopyError, WorkingCopyResult};
use crate::git::types::{
    CommitInfo, Credentials, DEFAULT_REMOTE, LOCAL_BRANCH_PREFIX, REMOTE_BRANCH_PREFIX,
};
use crate::git::WorkingCopy;

/// Build remote callbacks that authenticate with `credentials`.
///
/// libgit2 re-invokes the credential callback after a rejection, so the
/// callback answers once and then gives up.
pub(crate) fn remote_callbacks(credentials: Option<&Credentials>) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempted = false;

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        if attempted {
            log::warn!("[WorkingCopy] Credentials rejected by {}", url);
            return Err(git2::Error::from_str(
                "authentication failed: credentials rejected by remote",
            ));
        }
        attempted = true;

        match credentials {
            Some(Credentials::UserPass { username, password })
                if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) =>
            {
                Cred::userpass_plaintext(username, password)
            }
            Some(Credentials::Token(token))
                if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) =>
            {
                Cred::userpass_plaintext(username_from_url.unwrap_or("x-access-token"), token)
            }
            _ if allowed_types.contains(CredentialType::SSH_KEY) => {
                Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
            }
            _ if allowed_types.contains(CredentialType::DEFAULT) => Cred::default(),
            _ => Err(git2::Error::from_str(
                "remote requires authentication but no credentials are configured",
            )),
        }
    });

    callbacks
}

impl WorkingCopy {
    /// Push `refs/heads/<name>` to the same name on `origin`
    pub fn push_branch(
        &self,
        name: &str,
        credentials: Option<&Credentials>,
    ) -> WorkingCopyResult<()> {
        let refspec = format!("{0}{1}:{0}{1}", LOCAL_BRANCH_PREFIX, name);
        self.push_refspecs(&[refspec], credentials)?;

        log::info!("[WorkingCopy] Pushed branch {} to {}", name, DEFAULT_REMOTE);
        Ok(())
    }

    /// Push every local branch to `origin`
    pub fn push_all(&self, credentials: Option<&Credentials>) -> WorkingCopyResult<()> {
        let repo = self.repo()?;

        let mut refspecs = Vec::new();
        for branch in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.get().name() {
                refspecs.push(format!("{0}:{0}", name));
            }
        }

        if refspecs.is_empty() {
            log::debug!("[WorkingCopy] No local branches to push");
            return Ok(());
        }

        self.push_refspecs(&refspecs, credentials)?;
        log::info!(
            "[WorkingCopy] Pushed {} branches to {}",
            refspecs.len(),
            DEFAULT_REMOTE
        );
        Ok(())
    }

    /// Fetch `origin` and fast-forward the current branch.
    ///
    /// Diverged histories fail with [`WorkingCopyError::NonFastForward`]; no
    /// merge is attempted.
    pub fn pull(&self, credentials: Option<&Credentials>) -> WorkingCopyResult<()> {
        let repo = self.repo()?;
        let branch = self
            .current_branch()?
            .ok_or_else(|| git2::Error::from_str("cannot pull with a detached HEAD"))?;

        let mut remote = repo
            .find_remote(DEFAULT_REMOTE)
            .map_err(|_| WorkingCopyError::RemoteNotFound(DEFAULT_REMOTE.to_string()))?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(credentials));
        let configured_refspecs: &[&str] = &[];
        remote.fetch(configured_refspecs, Some(&mut fetch_options), None)?;

        let tracking_name = format!("{}{}", REMOTE_BRANCH_PREFIX, branch);
        let tracking = match repo.find_reference(&tracking_name) {
            Ok(reference) => reference,
            Err(e) if e.code() == ErrorCode::NotFound => {
                log::debug!("[WorkingCopy] {} has no remote counterpart yet", branch);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let fetched = repo.reference_to_annotated_commit(&tracking)?;
        let (analysis, _) = repo.merge_analysis(&[&fetched])?;

        if analysis.is_up_to_date() {
            log::debug!("[WorkingCopy] {} already up to date", branch);
            return Ok(());
        }
        if !(analysis.is_fast_forward() || analysis.is_unborn()) {
            return Err(WorkingCopyError::NonFastForward(branch));
        }

        let target = repo.find_object(fetched.id(), None)?;
        let mut opts = CheckoutBuilder::new();
        opts.safe();
        repo.checkout_tree(&target, Some(&mut opts))?;

        let local_name = format!("{}{}", LOCAL_BRANCH_PREFIX, branch);
        let reflog = format!("pull: fast-forward {} to {}", branch, fetched.id());
        match repo.find_reference(&local_name) {
            Ok(mut reference) => {
                reference.set_target(fetched.id(), &reflog)?;
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                repo.reference(&local_name, fetched.id(), true, &reflog)?;
            }
            Err(e) => return Err(e.into()),
        }
        repo.set_head(&local_name)?;

        log::info!("[WorkingCopy] Fast-forwarded {} to {}", branch, fetched.id());
        Ok(())
    }

    /// Tip of local `branch` when it is ahead of `origin/<branch>`.
    ///
    /// A missing remote-tracking ref counts as ahead. Equal or diverged
    /// histories yield `None`.
    pub fn unpublished_commit(&self, branch: &str) -> WorkingCopyResult<Option<CommitInfo>> {
        let repo = self.repo()?;

        let local = match repo.find_reference(&format!("{}{}", LOCAL_BRANCH_PREFIX, branch)) {
            Ok(reference) => reference.peel_to_commit()?,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let tracking = match repo.find_reference(&format!("{}{}", REMOTE_BRANCH_PREFIX, branch)) {
            Ok(reference) => reference.target(),
            Err(e) if e.code() == ErrorCode::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let ahead = match tracking {
            None => true,
            Some(published) if published == local.id() => false,
            Some(published) => repo.graph_descendant_of(local.id(), published)?,
        };

        Ok(ahead.then(|| commit_to_info(&local)))
    }

    fn push_refspecs(
        &self,
        refspecs: &[String],
        credentials: Option<&Credentials>,
    ) -> WorkingCopyResult<()> {
        let repo = self.repo()?;
        let mut remote = repo
            .find_remote(DEFAULT_REMOTE)
            .map_err(|_| WorkingCopyError::RemoteNotFound(DEFAULT_REMOTE.to_string()))?;

        let mut rejected: Vec<(String, String)> = Vec::new();
        {
            let mut callbacks = remote_callbacks(credentials);
            callbacks.push_update_reference(|refname, status| {
                if let Some(reason) = status {
                    rejected.push((refname.to_string(), reason.to_string()));
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);
            remote.push(refspecs, Some(&mut push_options))?;
        }

        match rejected.into_iter().next() {
            Some((refname, reason)) => Err(WorkingCopyError::PushRejected { refname, reason }),
            None => Ok(()),
        }
    }
}
