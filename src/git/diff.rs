//! Unified diff between two revisions, used as AI summarizer input.

use git2::{DiffFormat, DiffOptions, Oid, Repository};
use tracing::warn;

use crate::error::GitError;

/// Maximum characters for the unified diff text before truncation.
pub const MAX_DIFF_LENGTH: usize = 30_000;

/// Patch text between two commits.
#[derive(Debug, Clone, Default)]
pub struct RangeDiff {
    pub text: String,
    pub files_changed: usize,
    pub truncated: bool,
}

/// Diff the trees of `from` and `to`, restricted to `path_filters` when given.
pub fn diff_between(
    repo: &Repository,
    from: Oid,
    to: Oid,
    path_filters: &[String],
) -> Result<RangeDiff, GitError> {
    let from_tree = repo
        .find_commit(from)
        .and_then(|c| c.tree())
        .map_err(GitError::ParseCommit)?;
    let to_tree = repo
        .find_commit(to)
        .and_then(|c| c.tree())
        .map_err(GitError::ParseCommit)?;

    let mut opts = DiffOptions::new();
    for path in path_filters {
        opts.pathspec(path);
    }

    let diff = repo
        .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), Some(&mut opts))
        .map_err(GitError::DiffFailed)?;

    let mut text = String::new();
    let mut truncated = false;

    let printed = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if truncated {
            return true;
        }

        let content = String::from_utf8_lossy(line.content());

        // Check if adding this line would exceed the limit
        if text.len() + content.len() + 1 > MAX_DIFF_LENGTH {
            truncated = true;
            return true;
        }

        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(&content);

        true
    });

    if let Err(e) = printed {
        warn!("Failed to collect diff text: {e}");
        truncated = true;
    }

    Ok(RangeDiff {
        text,
        files_changed: diff.deltas().len(),
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use git2::Signature;

    use super::*;

    fn commit_file(repo: &Repository, dir: &Path, name: &str, content: &str) -> Oid {
        std::fs::write(dir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, name, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn test_diff_between_contains_changes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let first = commit_file(&repo, dir.path(), "a.txt", "one\n");
        let second = commit_file(&repo, dir.path(), "a.txt", "two\n");

        let diff = diff_between(&repo, first, second, &[]).unwrap();
        assert_eq!(diff.files_changed, 1);
        assert!(diff.text.contains("-one"));
        assert!(diff.text.contains("+two"));
        assert!(!diff.truncated);
    }

    #[test]
    fn test_diff_between_respects_path_filters() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let first = commit_file(&repo, dir.path(), "a.txt", "a\n");
        commit_file(&repo, dir.path(), "b.txt", "b\n");
        let last = commit_file(&repo, dir.path(), "a.txt", "a2\n");

        let diff = diff_between(&repo, first, last, &["b.txt".to_string()]).unwrap();
        assert_eq!(diff.files_changed, 1);
        assert!(diff.text.contains("b.txt"));
        assert!(!diff.text.contains("a2"));
    }

    #[test]
    fn test_diff_between_truncates_large_diffs() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let first = commit_file(&repo, dir.path(), "big.txt", "start\n");
        let big: String = (0..5_000).map(|i| format!("line number {i}\n")).collect();
        let second = commit_file(&repo, dir.path(), "big.txt", &big);

        let diff = diff_between(&repo, first, second, &[]).unwrap();
        assert!(diff.truncated);
        assert!(diff.text.len() <= MAX_DIFF_LENGTH);
    }
}
