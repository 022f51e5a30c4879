//! GitHub organization/repository detection from the `origin` remote.

use std::sync::LazyLock;

use git2::Repository;
use regex_lite::Regex;
use tracing::debug;

static REMOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https://github\.com/|git@github\.com:)(?P<organization>[^/]+)/(?P<repository>[^.]+)(\.git)?$",
    )
    .expect("Invalid remote regex")
});

/// Owner and name of a GitHub repository. Both are empty when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteIdentity {
    pub organization: String,
    pub name: String,
}

impl RemoteIdentity {
    pub fn is_known(&self) -> bool {
        !self.organization.is_empty() && !self.name.is_empty()
    }
}

/// Extract owner and repo from a GitHub remote URL.
pub fn parse_github_remote(url: &str) -> Option<RemoteIdentity> {
    let caps = REMOTE_RE.captures(url)?;
    Some(RemoteIdentity {
        organization: caps["organization"].to_string(),
        name: caps["repository"].to_string(),
    })
}

/// Identity of the `origin` remote, empty when missing or not on GitHub.
pub fn origin_identity(repo: &Repository) -> RemoteIdentity {
    let remote = match repo.find_remote("origin") {
        Ok(remote) => remote,
        Err(e) => {
            debug!(error = %e, "No 'origin' remote found");
            return RemoteIdentity::default();
        }
    };

    match remote.url().and_then(parse_github_remote) {
        Some(identity) => identity,
        None => {
            debug!(url = ?remote.url(), "Origin is not a GitHub remote");
            RemoteIdentity::default()
        }
    }
}
