//! Repository context: release tags, the commits between them and remote identity.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use git2::Repository;
use tracing::{debug, info};

use crate::error::GitError;
use crate::git::{
    Commit, RangeDiff, RemoteIdentity, TagMatcher, TargetRange, diff_between, fetch_commits,
    list_merged_tags, matcher_for, origin_identity, resolve_reference,
};

/// Revision used as current tag when no release tag exists.
pub const HEAD: &str = "HEAD";

/// A working copy bound to an optional tag prefix and path filters.
///
/// Tags and the commits since the last tag are read once and cached for the
/// lifetime of the manager; open a new manager to see new tags.
pub struct RepositoryManager {
    repo: Repository,
    path: PathBuf,
    matcher: Box<dyn TagMatcher>,
    path_filters: Vec<String>,
    identity: RemoteIdentity,
    tags: OnceCell<Vec<String>>,
    commits_since_last_tag: OnceCell<Vec<Commit>>,
}

impl RepositoryManager {
    /// Open the working copy at `path`. Bare repositories are rejected.
    pub fn open(
        path: impl AsRef<Path>,
        prefix: Option<&str>,
        path_filters: Vec<String>,
    ) -> Result<Self, GitError> {
        let path = path.as_ref().to_path_buf();
        let repo = Repository::open(&path).map_err(GitError::OpenRepository)?;

        if repo.is_bare() {
            return Err(GitError::BareRepository(repo.path().to_path_buf()));
        }

        let identity = origin_identity(&repo);
        debug!(
            organization = %identity.organization,
            name = %identity.name,
            "Opened repository"
        );

        Ok(Self {
            repo,
            path,
            matcher: matcher_for(prefix),
            path_filters,
            identity,
            tags: OnceCell::new(),
            commits_since_last_tag: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn identity(&self) -> &RemoteIdentity {
        &self.identity
    }

    /// GitHub organization of `origin`, empty when unknown.
    pub fn organization(&self) -> &str {
        &self.identity.organization
    }

    /// GitHub repository name of `origin`, empty when unknown.
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Release tags merged into HEAD, newest first.
    pub fn list_release_tags(&self) -> Result<&[String], GitError> {
        if let Some(tags) = self.tags.get() {
            return Ok(tags);
        }

        let glob = self.matcher.glob();
        let merged = list_merged_tags(&self.repo, glob.as_deref())?;
        let tags = self.matcher.release_tags(&merged);
        debug!(merged = merged.len(), releases = tags.len(), "Resolved release tags");

        Ok(self.tags.get_or_init(|| tags))
    }

    /// Most recent release tag, or `HEAD` when there is none.
    pub fn current_tag(&self) -> Result<&str, GitError> {
        Ok(self.list_release_tags()?.first().map(String::as_str).unwrap_or(HEAD))
    }

    /// Second most recent release tag, or an empty string.
    pub fn previous_tag(&self) -> Result<&str, GitError> {
        Ok(self.list_release_tags()?.get(1).map(String::as_str).unwrap_or(""))
    }

    /// Commits in `previous..current`, or everything reachable from `current`
    /// when there is no previous tag.
    pub fn commits_since_last_tag(&self) -> Result<&[Commit], GitError> {
        if let Some(commits) = self.commits_since_last_tag.get() {
            return Ok(commits);
        }

        let previous = self.previous_tag()?.to_string();
        let current = self.current_tag()?.to_string();
        let commits = self.commits_between(&previous, &current)?;
        info!(
            previous = %previous,
            current = %current,
            count = commits.len(),
            "Collected commits since last tag"
        );

        Ok(self.commits_since_last_tag.get_or_init(|| commits))
    }

    /// Commits in `tag..current`.
    pub fn commits_since_tag(&self, tag: &str) -> Result<Vec<Commit>, GitError> {
        let current = self.current_tag()?.to_string();
        self.commits_between(tag, &current)
    }

    /// Commits for an explicit `rev1..rev2` target.
    pub fn commits_in_target(&self, target: &TargetRange) -> Result<Vec<Commit>, GitError> {
        self.commits_between(&target.from_ref, &target.to_ref)
    }

    /// Non-merge commits reachable from `to` but not from `from`.
    ///
    /// An empty `from` walks the whole history of `to`.
    pub fn commits_between(&self, from: &str, to: &str) -> Result<Vec<Commit>, GitError> {
        let to_oid = resolve_reference(&self.repo, to)?;
        let from_oid = if from.is_empty() {
            None
        } else {
            Some(resolve_reference(&self.repo, from)?)
        };

        fetch_commits(&self.repo, from_oid, to_oid, &self.path_filters)
    }

    /// GitHub compare URL from `tag` to the current tag.
    pub fn compare_link(&self, tag: &str) -> Result<Option<String>, GitError> {
        let current = self.current_tag()?;
        Ok(compare_url(&self.identity, tag, current))
    }

    /// Patch between the previous and current tags, restricted to the path filters.
    ///
    /// `None` when there is no previous tag to diff against.
    pub fn diff_since_last_tag(&self) -> Result<Option<RangeDiff>, GitError> {
        let previous = self.previous_tag()?;
        if previous.is_empty() {
            return Ok(None);
        }

        let from = resolve_reference(&self.repo, previous)?;
        let to = resolve_reference(&self.repo, self.current_tag()?)?;
        diff_between(&self.repo, from, to, &self.path_filters).map(Some)
    }

    /// Commit time of the revision, when it resolves.
    pub fn release_date(&self, revision: &str) -> Option<DateTime<Utc>> {
        let oid = resolve_reference(&self.repo, revision).ok()?;
        let commit = self.repo.find_commit(oid).ok()?;
        Utc.timestamp_opt(commit.time().seconds(), 0).single()
    }
}

/// `https://github.com/<org>/<repo>/compare/<from>...<to>` when the remote is known.
pub fn compare_url(identity: &RemoteIdentity, from: &str, to: &str) -> Option<String> {
    if !identity.is_known() || from.is_empty() {
        return None;
    }
    Some(format!(
        "https://github.com/{}/{}/compare/{}...{}",
        identity.organization, identity.name, from, to
    ))
}
