//! Working directory file lookups for WorkingCopy

use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::git::error::WorkingCopyResult;
use crate::git::WorkingCopy;

/// Repository metadata directory, never treated as working tree content
pub const GIT_DIR: &str = ".git";

impl WorkingCopy {
    /// First regular file anywhere under the working directory whose base
    /// name equals `name` exactly.
    ///
    /// Returns `None` when nothing matches, when `name` is blank or carries a
    /// path component, or when the working directory is gone. The metadata
    /// directory is not searched.
    pub fn find_file_by_name(&self, name: &str) -> WorkingCopyResult<Option<PathBuf>> {
        self.repo()?;

        if name.trim().is_empty() || name.contains(['/', '\\']) {
            return Ok(None);
        }
        if !self.workdir().exists() {
            return Ok(None);
        }

        let found = WalkDir::new(self.workdir())
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != GIT_DIR)
            .filter_map(Result::ok)
            .find(|entry| entry.file_type().is_file() && entry.file_name() == name)
            .map(|entry| entry.into_path());

        Ok(found)
    }

    /// Immediate entries of the working directory, relative to it and sorted.
    ///
    /// Not recursive; the metadata directory is omitted.
    pub fn list_root_entries(&self) -> WorkingCopyResult<Vec<String>> {
        self.repo()?;

        let mut entries = Vec::new();
        for entry in fs::read_dir(self.workdir())? {
            let entry = entry?;
            let name = entry.file_name();
            if name == GIT_DIR {
                continue;
            }
            entries.push(name.to_string_lossy().to_string());
        }

        entries.sort();
        Ok(entries)
    }
}
