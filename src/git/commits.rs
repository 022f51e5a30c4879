//! Commit classification and range fetching.

use std::sync::LazyLock;

use git2::{DiffOptions, Oid, Repository, Sort};
use regex_lite::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::GitError;

/// Type assigned to summaries that are not conventional headers.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Scope assigned when the header carries none.
pub const ANY_SCOPE: &str = "any";

/// Type assigned to revert commits.
pub const REVERT_TYPE: &str = "revert";

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[^(]+)\((?P<scope>[^)]+)\): (?P<subject>.+)$")
        .expect("Invalid header regex")
});

static REVERT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[Rr]evert:? (?P<summary>.*)$").expect("Invalid revert regex")
});

/// Issue keys: a 2 to 4 character project key starting with two uppercase
/// letters, a hyphen and 1 to 6 digits, standing alone as a word.
static JIRA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{2}[A-Z0-9]{0,2}-[0-9]{1,6}\b").expect("Invalid jira regex")
});

/// A commit classified by its conventional header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub hash: String,
    pub short: String,
    pub summary: String,
    pub message: String,
    pub commit_type: String,
    pub scope: String,
    pub subject: String,
    /// The commit this one reverts, rebuilt from the revert header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revert: Option<Box<Commit>>,
    pub jiras: Vec<String>,
}

impl Commit {
    /// Build a commit and derive its type, scope, subject, revert and jira references.
    pub fn new(
        hash: impl Into<String>,
        summary: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut commit = Self::from_header(hash.into(), summary.into(), message.into());
        commit.apply_revert();
        commit.jiras = extract_jiras(&commit.message);
        commit
    }

    /// Build a commit from a git2 commit.
    ///
    /// The summary is the first line of the message only.
    pub fn from_git2_commit(commit: &git2::Commit<'_>) -> Self {
        let message = commit.message().unwrap_or("").to_string();
        let summary = message.lines().next().unwrap_or("").to_string();
        Self::new(commit.id().to_string(), summary, message)
    }

    /// Header-only construction, used for the reverted child.
    fn from_header(hash: String, summary: String, message: String) -> Self {
        let (commit_type, scope, subject) = parse_header(&summary);
        let short = hash.chars().take(8).collect();

        Self {
            hash,
            short,
            summary,
            message,
            commit_type,
            scope,
            subject,
            revert: None,
            jiras: Vec::new(),
        }
    }

    fn apply_revert(&mut self) {
        let Some(caps) = REVERT_RE.captures(&self.summary) else {
            return;
        };
        let inner = caps["summary"].to_string();

        let reverted = Self::from_header(String::new(), inner.clone(), inner.clone());

        self.commit_type = REVERT_TYPE.to_string();
        match HEADER_RE.captures(&inner) {
            Some(inner_caps) => {
                self.scope = inner_caps["scope"].to_string();
                self.subject = format!("revert {}", &inner_caps["subject"]);
            }
            None => {
                self.scope = ANY_SCOPE.to_string();
                self.subject = format!("revert {}", inner);
            }
        }
        self.revert = Some(Box::new(reverted));
    }

    pub fn is_revert(&self) -> bool {
        self.revert.is_some()
    }
}

/// Split a `type(scope): subject` header.
///
/// Summaries that do not match classify as `unknown` / `any` with the whole
/// summary as subject.
pub fn parse_header(summary: &str) -> (String, String, String) {
    match HEADER_RE.captures(summary) {
        Some(caps) => (
            caps["type"].to_string(),
            caps["scope"].to_string(),
            caps["subject"].to_string(),
        ),
        None => (
            UNKNOWN_TYPE.to_string(),
            ANY_SCOPE.to_string(),
            summary.to_string(),
        ),
    }
}

/// Collect issue tracker references (`ABCD-123`) from every line of a message.
pub fn extract_jiras(message: &str) -> Vec<String> {
    message
        .lines()
        .flat_map(|line| JIRA_RE.find_iter(line).map(|m| m.as_str().to_string()))
        .collect()
}

/// Fetch the non-merge commits reachable from `to` and not from `from`, newest first.
///
/// With `from == None` the whole history reachable from `to` is walked. When
/// `path_filters` is non-empty only commits touching at least one of the paths
/// are kept.
pub fn fetch_commits(
    repo: &Repository,
    from: Option<Oid>,
    to: Oid,
    path_filters: &[String],
) -> Result<Vec<Commit>, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
        .map_err(GitError::RevwalkError)?;

    revwalk.push(to).map_err(GitError::RevwalkError)?;
    if let Some(from) = from {
        revwalk.hide(from).map_err(GitError::RevwalkError)?;
    }

    let mut commits = Vec::new();

    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;

        if commit.parent_count() > 1 {
            continue;
        }

        if !path_filters.is_empty() && !touches_paths(repo, &commit, path_filters)? {
            continue;
        }

        commits.push(Commit::from_git2_commit(&commit));
    }

    debug!(count = commits.len(), "Fetched commits");
    Ok(commits)
}

/// Whether the commit changes a file under any of the pathspecs.
fn touches_paths(
    repo: &Repository,
    commit: &git2::Commit<'_>,
    path_filters: &[String],
) -> Result<bool, GitError> {
    let tree = commit.tree().map_err(GitError::ParseCommit)?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree().map_err(GitError::ParseCommit)?),
        Err(_) => None,
    };

    let mut opts = DiffOptions::new();
    for path in path_filters {
        opts.pathspec(path);
    }

    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
        .map_err(GitError::DiffFailed)?;

    Ok(diff.deltas().len() > 0)
}
