//! Tests for RepositoryManager
//!
//! Each fixture is a working repository with one commit on `main`, published
//! to a bare repository registered as `origin`.

#[cfg(test)]
mod tests {
    use crate::config::{RepositoryDescriptor, RepositoryRegistry};
    use crate::git::WorkingCopy;
    use crate::repository::{
        ErrorCategory, FileCommitIntent, RepositoryError, RepositoryManager,
    };
    use git2::{Repository, RepositoryInitOptions};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        temp_dir: TempDir,
        descriptor: RepositoryDescriptor,
        manager: RepositoryManager,
    }

    impl Fixture {
        fn work_path(&self) -> std::path::PathBuf {
            self.temp_dir.path().join("work")
        }

        fn remote(&self) -> Repository {
            Repository::open_bare(self.temp_dir.path().join("origin.git")).unwrap()
        }
    }

    fn manager_for(descriptor: &RepositoryDescriptor) -> RepositoryManager {
        let registry = RepositoryRegistry::from_descriptors(vec![descriptor.clone()]).unwrap();
        RepositoryManager::new(Arc::new(registry))
    }

    fn setup_fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let work_path = temp_dir.path().join("work");
        let remote_path = temp_dir.path().join("origin.git");

        let mut opts = RepositoryInitOptions::new();
        opts.bare(true).initial_head("main");
        Repository::init_opts(&remote_path, &opts).unwrap();

        let mut copy = WorkingCopy::open_or_init(&work_path, Some("main")).unwrap();
        fs::write(work_path.join("README.md"), "# Sample").unwrap();
        copy.stage_all().unwrap();
        copy.commit("Initial commit", "Test User", "test@example.com")
            .unwrap();
        copy.close();

        Repository::open(&work_path)
            .unwrap()
            .remote("origin", remote_path.to_str().unwrap())
            .unwrap();
        let mut copy = WorkingCopy::open_or_init(&work_path, Some("main")).unwrap();
        copy.push_branch("main", None).unwrap();
        copy.close();

        let mut descriptor = RepositoryDescriptor::new("demo", "sample", &work_path);
        descriptor.remote_url = Some(remote_path.to_string_lossy().to_string());
        let manager = manager_for(&descriptor);

        Fixture {
            temp_dir,
            descriptor,
            manager,
        }
    }

    #[test]
    fn test_descriptor_lookup() {
        let fixture = setup_fixture();

        let found = fixture.manager.descriptor("DEMO", "Sample").unwrap();
        assert_eq!(found.path, fixture.work_path());

        let missing = fixture.manager.descriptor("demo", "unknown").unwrap_err();
        assert_eq!(missing.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_ensure_repository_path() {
        let fixture = setup_fixture();
        RepositoryManager::ensure_repository_path(&fixture.descriptor).unwrap();

        let missing = RepositoryDescriptor::new("demo", "gone", fixture.temp_dir.path().join("gone"));
        assert!(matches!(
            RepositoryManager::ensure_repository_path(&missing),
            Err(RepositoryError::PathMissing(_))
        ));

        let plain_dir = TempDir::new().unwrap();
        let plain = RepositoryDescriptor::new("demo", "plain", plain_dir.path());
        assert!(matches!(
            RepositoryManager::ensure_repository_path(&plain),
            Err(RepositoryError::NotARepository(_))
        ));
    }

    #[test]
    fn test_list_branches_includes_remote_tracking() {
        let fixture = setup_fixture();

        let branches = fixture.manager.list_branches(&fixture.descriptor).unwrap();
        assert!(branches.contains(&"refs/heads/main".to_string()));
        assert!(branches.contains(&"refs/remotes/origin/main".to_string()));
    }

    #[test]
    fn test_create_branch_is_idempotent() {
        let fixture = setup_fixture();

        fixture
            .manager
            .create_branch("feature/x", None, &fixture.descriptor)
            .unwrap();
        fixture
            .manager
            .create_branch("feature/x", None, &fixture.descriptor)
            .unwrap();

        let branches = fixture.manager.list_branches(&fixture.descriptor).unwrap();
        let local: Vec<_> = branches
            .iter()
            .filter(|b| *b == "refs/heads/feature/x")
            .collect();
        assert_eq!(local.len(), 1);
        assert!(branches.contains(&"refs/remotes/origin/feature/x".to_string()));
        assert!(fixture.remote().find_reference("refs/heads/feature/x").is_ok());
    }

    #[test]
    fn test_create_branch_normalizes_prefixes() {
        let fixture = setup_fixture();

        for name in ["refs/heads/foo", "refs/remotes/origin/foo", "foo"] {
            fixture
                .manager
                .create_branch(name, None, &fixture.descriptor)
                .unwrap();
        }

        let branches = fixture.manager.list_branches(&fixture.descriptor).unwrap();
        let local: Vec<_> = branches
            .iter()
            .filter(|b| b.starts_with("refs/heads/"))
            .collect();
        assert_eq!(local.len(), 2, "unexpected branches: {:?}", branches);
        assert!(branches.contains(&"refs/heads/foo".to_string()));
        assert!(!branches.iter().any(|b| b.contains("refs/heads/refs")));
    }

    #[test]
    fn test_create_branch_rejects_blank_name() {
        let fixture = setup_fixture();

        for name in ["", "   ", "refs/heads/"] {
            let err = fixture
                .manager
                .create_branch(name, None, &fixture.descriptor)
                .unwrap_err();
            assert_eq!(err.category(), ErrorCategory::InvalidArgument);
        }
    }

    #[test]
    fn test_create_branch_from_missing_source_fails() {
        let fixture = setup_fixture();

        let err = fixture
            .manager
            .create_branch("feature/y", Some("does-not-exist"), &fixture.descriptor)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::VersionControlError);
    }

    #[test]
    fn test_create_branch_forks_from_source() {
        let fixture = setup_fixture();

        fixture
            .manager
            .create_branch("develop", None, &fixture.descriptor)
            .unwrap();
        fixture
            .manager
            .commit_file(
                &FileCommitIntent::new("develop.txt", "only on develop").on_branch("develop"),
                &fixture.descriptor,
            )
            .unwrap();
        fixture
            .manager
            .create_branch("feature/z", Some("develop"), &fixture.descriptor)
            .unwrap();

        let content = fixture
            .manager
            .get_file("develop.txt", &fixture.descriptor, Some("feature/z"))
            .unwrap();
        assert_eq!(content, b"only on develop");
    }

    #[test]
    fn test_create_branch_in_empty_repository_fails() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = RepositoryDescriptor::new("demo", "empty", temp_dir.path().join("empty"));
        let manager = manager_for(&descriptor);

        let err = manager
            .create_branch("feature/x", None, &descriptor)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::VersionControlError);
    }

    #[test]
    fn test_commit_then_get_round_trip() {
        let fixture = setup_fixture();
        fixture
            .manager
            .create_branch("b", None, &fixture.descriptor)
            .unwrap();

        let content = b"<definitions id=\"round-trip\"/>".to_vec();
        let receipt = fixture
            .manager
            .commit_file(
                &FileCommitIntent::new("f.dmn", content.clone())
                    .on_branch("b")
                    .with_message("Add f")
                    .with_author("Jane Doe", "jane@example.com"),
                &fixture.descriptor,
            )
            .unwrap();
        assert_eq!(receipt.branch, "b");

        let fetched = fixture
            .manager
            .get_file("f.dmn", &fixture.descriptor, Some("b"))
            .unwrap();
        assert_eq!(fetched, content);

        // Published, not just committed
        let remote = fixture.remote();
        let remote_head = remote
            .find_reference("refs/heads/b")
            .unwrap()
            .target()
            .unwrap();
        assert_eq!(remote_head.to_string(), receipt.commit_id);

        // Not visible on main
        let err = fixture
            .manager
            .get_file("f.dmn", &fixture.descriptor, None)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_commit_uses_default_author() {
        let fixture = setup_fixture();

        fixture
            .manager
            .commit_file(
                &FileCommitIntent::new("defaults.txt", "x"),
                &fixture.descriptor,
            )
            .unwrap();

        let copy = WorkingCopy::open_or_init(fixture.work_path(), None).unwrap();
        let latest = &copy.log(1).unwrap()[0];
        assert_eq!(latest.author, "Repository Admin");
        assert_eq!(latest.email, "repository-manager@localhost");
        assert_eq!(latest.message, "Update defaults.txt");
    }

    #[test]
    fn test_commit_rejects_traversal() {
        let fixture = setup_fixture();

        for name in ["../escaped.txt", "../../etc/passwd", "sub/../../escaped.txt"] {
            let err = fixture
                .manager
                .commit_file(&FileCommitIntent::new(name, "evil"), &fixture.descriptor)
                .unwrap_err();
            assert_eq!(err.category(), ErrorCategory::InvalidArgument, "{}", name);
        }

        assert!(!fixture.temp_dir.path().join("escaped.txt").exists());
    }

    #[test]
    fn test_commit_rejects_metadata_destination() {
        let fixture = setup_fixture();

        let err = fixture
            .manager
            .commit_file(
                &FileCommitIntent::new(".git/hooks/pre-commit", "#!/bin/sh"),
                &fixture.descriptor,
            )
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
        assert!(!fixture.work_path().join(".git/hooks/pre-commit").exists());
    }

    #[test]
    fn test_commit_rejects_empty_upload() {
        let fixture = setup_fixture();

        let err = fixture
            .manager
            .commit_file(&FileCommitIntent::new("empty.txt", Vec::<u8>::new()), &fixture.descriptor)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);

        let err = fixture
            .manager
            .commit_file(&FileCommitIntent::new("  ", "content"), &fixture.descriptor)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }

    #[test]
    fn test_commit_to_missing_branch_fails() {
        let fixture = setup_fixture();

        let err = fixture
            .manager
            .commit_file(
                &FileCommitIntent::new("x.txt", "x").on_branch("nope"),
                &fixture.descriptor,
            )
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::VersionControlError);
        assert!(!fixture.work_path().join("x.txt").exists());
    }

    #[test]
    fn test_commit_without_remote_reports_unpublished_commit() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = RepositoryDescriptor::new("demo", "local", temp_dir.path().join("local"));
        let manager = manager_for(&descriptor);

        let err = manager
            .commit_file(&FileCommitIntent::new("a.txt", "a"), &descriptor)
            .unwrap_err();

        let RepositoryError::PublishFailed {
            commit_id, branch, ..
        } = err
        else {
            panic!("expected PublishFailed");
        };
        assert_eq!(branch, "main");

        // The local commit is kept
        let copy = WorkingCopy::open_or_init(&descriptor.path, None).unwrap();
        assert_eq!(copy.log(1).unwrap()[0].id, commit_id);
    }

    #[test]
    fn test_retrying_upload_publishes_pending_commit() {
        let fixture = setup_fixture();
        let remote_path = fixture.temp_dir.path().join("origin.git");
        let moved_path = fixture.temp_dir.path().join("origin.moved");
        let intent = FileCommitIntent::new("retry.txt", "retry me");

        fs::rename(&remote_path, &moved_path).unwrap();
        let err = fixture
            .manager
            .commit_file(&intent, &fixture.descriptor)
            .unwrap_err();
        let RepositoryError::PublishFailed { commit_id, .. } = err else {
            panic!("expected PublishFailed, got {:?}", err);
        };

        fs::rename(&moved_path, &remote_path).unwrap();
        let receipt = fixture
            .manager
            .commit_file(&intent, &fixture.descriptor)
            .unwrap();
        assert_eq!(receipt.commit_id, commit_id);
        assert_eq!(receipt.branch, "main");

        let remote_head = fixture
            .remote()
            .find_reference("refs/heads/main")
            .unwrap()
            .target()
            .unwrap();
        assert_eq!(remote_head.to_string(), commit_id);

        // Nothing left to publish
        let err = fixture
            .manager
            .commit_file(&intent, &fixture.descriptor)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::VersionControlError);
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_rejects_symlinked_directory() {
        let fixture = setup_fixture();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), fixture.work_path().join("link")).unwrap();

        let err = fixture
            .manager
            .commit_file(&FileCommitIntent::new("link/x.txt", "evil"), &fixture.descriptor)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
        assert!(!outside.path().join("x.txt").exists());

        // Regular subdirectories are still accepted
        fixture
            .manager
            .commit_file(&FileCommitIntent::new("sub/y.txt", "fine"), &fixture.descriptor)
            .unwrap();
    }

    #[test]
    fn test_list_files_is_not_recursive() {
        let fixture = setup_fixture();

        fixture
            .manager
            .commit_file(&FileCommitIntent::new("a.txt", "a"), &fixture.descriptor)
            .unwrap();
        fixture
            .manager
            .commit_file(&FileCommitIntent::new("sub/b.txt", "b"), &fixture.descriptor)
            .unwrap();

        let files = fixture.manager.list_files(&fixture.descriptor).unwrap();
        assert_eq!(files, vec!["README.md", "a.txt", "sub"]);
    }

    #[test]
    fn test_list_files_returns_to_main() {
        let fixture = setup_fixture();
        fixture
            .manager
            .create_branch("side", None, &fixture.descriptor)
            .unwrap();
        fixture
            .manager
            .commit_file(
                &FileCommitIntent::new("side.txt", "side").on_branch("side"),
                &fixture.descriptor,
            )
            .unwrap();

        let files = fixture.manager.list_files(&fixture.descriptor).unwrap();
        assert_eq!(files, vec!["README.md"]);

        let on_side = fixture
            .manager
            .list_files(&fixture.descriptor.with_main_branch(Some("side")))
            .unwrap();
        assert_eq!(on_side, vec!["README.md", "side.txt"]);
    }

    #[test]
    fn test_get_file_validation() {
        let fixture = setup_fixture();

        let err = fixture
            .manager
            .get_file("docs/README.md", &fixture.descriptor, None)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);

        let err = fixture
            .manager
            .get_file("missing.md", &fixture.descriptor, None)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::FileNotFound(_)));

        let err = fixture
            .manager
            .get_file("README.md", &fixture.descriptor, Some("no-such-branch"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::VersionControlError);
    }

    #[test]
    fn test_ensure_cloned() {
        let fixture = setup_fixture();

        let mut descriptor = fixture.descriptor.clone();
        descriptor.path = fixture.temp_dir.path().join("clone");

        assert!(fixture.manager.ensure_cloned(&descriptor).unwrap());
        assert!(descriptor.path.join("README.md").exists());
        assert!(!fixture.manager.ensure_cloned(&descriptor).unwrap());
    }

    #[test]
    fn test_ensure_cloned_without_remote_url() {
        let temp_dir = TempDir::new().unwrap();
        let descriptor = RepositoryDescriptor::new("demo", "x", temp_dir.path().join("x"));
        let manager = manager_for(&descriptor);

        let err = manager.ensure_cloned(&descriptor).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }
}
