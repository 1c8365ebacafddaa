//! Status operations for WorkingCopy

use git2::{Status, StatusOptions};

use crate::git::error::WorkingCopyResult;
use crate::git::types::StatusSummary;
use crate::git::WorkingCopy;

impl WorkingCopy {
    /// Added/modified/untracked/deleted files relative to the index and HEAD
    pub fn status(&self) -> WorkingCopyResult<StatusSummary> {
        let repo = self.repo()?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        opts.recurse_untracked_dirs(true);

        let statuses = repo.statuses(Some(&mut opts))?;

        let mut summary = StatusSummary::default();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            let status = entry.status();
            let path = path.to_string();

            if status.contains(Status::INDEX_NEW) {
                summary.added.push(path);
            } else if status.contains(Status::WT_NEW) {
                summary.untracked.push(path);
            } else if status.intersects(Status::INDEX_DELETED | Status::WT_DELETED) {
                summary.deleted.push(path);
            } else if status.intersects(
                Status::INDEX_MODIFIED
                    | Status::WT_MODIFIED
                    | Status::INDEX_RENAMED
                    | Status::WT_RENAMED
                    | Status::INDEX_TYPECHANGE
                    | Status::WT_TYPECHANGE,
            ) {
                summary.modified.push(path);
            }
        }

        Ok(summary)
    }
}
