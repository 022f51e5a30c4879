//! Revision range parsing and reference resolution.

use git2::{Oid, Repository};

use crate::error::GitError;

/// An explicit `rev1..rev2` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRange {
    /// Start of the range, excluded. Empty means "from the root".
    pub from_ref: String,
    /// End of the range, included.
    pub to_ref: String,
}

impl TargetRange {
    /// Parse a `rev1..rev2` string.
    pub fn parse(target: &str) -> Result<Self, GitError> {
        let (from, to) = target
            .split_once("..")
            .ok_or_else(|| GitError::InvalidTarget(target.to_string()))?;

        // `rev1...rev2` is a symmetric difference, which is not supported here.
        if to.is_empty() || to.starts_with('.') || to.contains("..") {
            return Err(GitError::InvalidTarget(target.to_string()));
        }

        Ok(Self {
            from_ref: from.to_string(),
            to_ref: to.to_string(),
        })
    }

    /// Revision string as git would print it.
    pub fn revision(&self) -> String {
        if self.from_ref.is_empty() {
            self.to_ref.clone()
        } else {
            format!("{}..{}", self.from_ref, self.to_ref)
        }
    }
}

/// Resolve a reference (tag, branch, commit hash, `HEAD`) to a commit OID.
pub fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    // Try as a direct OID first
    if let Ok(oid) = Oid::from_str(reference) {
        if reference.len() == 40 && repo.find_commit(oid).is_ok() {
            return Ok(oid);
        }
    }

    let obj = repo
        .revparse_single(reference)
        .map_err(|e| GitError::ReferenceNotFound(reference.to_string(), e))?;
    let commit = obj.peel_to_commit().map_err(GitError::ParseCommit)?;
    Ok(commit.id())
}
