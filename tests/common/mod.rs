//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Create a commit touching `test.txt`. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let content = format!(
            "{}\n{}",
            message,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        );
        self.commit_file("test.txt", &content, message)
    }

    /// Write `content` to `path` (relative to the repo root) and commit it on HEAD.
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> Oid {
        let tree_id = self.stage(path, content);
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let sig = self.signature();

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a commit on top of HEAD without moving HEAD.
    ///
    /// The commit is not reachable from HEAD, like work on an unmerged branch.
    pub fn detached_commit(&self, message: &str) -> Oid {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("HEAD must have a commit");
        let tree = head.tree().expect("Failed to get tree");
        let sig = self.signature();

        self.repo
            .commit(None, &sig, &sig, message, &tree, &[&head])
            .expect("Failed to create commit")
    }

    /// Create a merge commit on HEAD joining `other`.
    pub fn merge_commit(&self, message: &str, other: Oid) -> Oid {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("HEAD must have a commit");
        let other = self.repo.find_commit(other).expect("Failed to find commit");
        let tree = head.tree().expect("Failed to get tree");
        let sig = self.signature();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&head, &other])
            .expect("Failed to create merge commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str) {
        let sig = self.signature();
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag(name, &obj, &sig, message, false)
            .expect("Failed to create annotated tag");
    }

    /// Add an `origin` remote.
    pub fn set_origin(&self, url: &str) {
        self.repo.remote("origin", url).expect("Failed to add remote");
    }

    fn stage(&self, path: &str, content: &str) -> Oid {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(path)).expect("Failed to add file");
        index.write().expect("Failed to write index");
        index.write_tree().expect("Failed to write tree")
    }
}
