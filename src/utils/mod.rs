// Utility functions

use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// =============================================================================
// String Helpers
// =============================================================================

/// True when `value` is empty or whitespace only.
#[inline]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `Some(value)` when it carries non-whitespace text.
///
/// # Example
/// ```ignore
/// use crate::utils::non_blank;
///
/// let user = non_blank(intent.author_name.as_deref()).unwrap_or(&descriptor.default_commit_user);
/// ```
#[inline]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_blank(v))
}

// =============================================================================
// Path Helpers
// =============================================================================

/// Lexically resolve `.` and `..` components without touching the filesystem.
///
/// A `..` that would climb above a root or prefix is dropped; one that would
/// climb above a relative start is kept so callers can detect the escape.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match result.last() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => result.push(component),
            },
            other => result.push(other),
        }
    }

    result.iter().map(|c| c.as_os_str()).collect()
}

/// True when `path` lies strictly below `root` after lexical normalization.
pub fn is_strictly_within(root: &Path, path: &Path) -> bool {
    let root = normalize_path(root);
    let path = normalize_path(path);
    path != root && path.starts_with(&root)
}

// =============================================================================
// Locking
// =============================================================================

/// Safely acquire a mutex lock, recovering from poisoning by returning the guard.
/// Use this instead of `.lock().unwrap()` or `.lock().expect(...)`.
pub fn lock_mutex_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Mutex was poisoned, recovering: {}", poisoned);
            poisoned.into_inner()
        }
    }
}
