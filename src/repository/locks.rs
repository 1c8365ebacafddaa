//! Per-path serialization of working tree operations

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::utils::{lock_mutex_recover, normalize_path};

/// One mutex per repository path, created on first use.
///
/// Holding the returned lock excludes every other operation on the same
/// working tree; different paths never contend.
#[derive(Default)]
pub struct RepositoryLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl RepositoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding `path`; callers hold its guard for the whole operation
    pub fn for_path(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = lock_mutex_recover(&self.locks);
        locks
            .entry(normalize_path(path))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        lock_mutex_recover(&self.locks).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_path_shares_lock() {
        let locks = RepositoryLocks::new();
        let a = locks.for_path(Path::new("/repos/a"));
        let b = locks.for_path(Path::new("/repos/./a"));
        let c = locks.for_path(Path::new("/repos/c"));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn test_operations_on_same_path_do_not_overlap() {
        let locks = Arc::new(RepositoryLocks::new());
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let active = Arc::clone(&active);
                let max_active = Arc::clone(&max_active);
                thread::spawn(move || {
                    let lock = locks.for_path(Path::new("/repos/shared"));
                    let _guard = lock_mutex_recover(&lock);
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_active.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }
}
