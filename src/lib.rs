//! changelog-generator - renders release changelogs from conventional commits.
//!
//! # Overview
//!
//! Release tags (optionally namespaced as `<prefix>/X.Y.Z`) delimit releases.
//! The commits between the two most recent release tags are classified from
//! their conventional-commit headers, grouped into trees (features, fixes,
//! documentation, reverts, others), trimmed to a length budget and rendered as
//! markdown or JSON. An optional AI summary of the diff can be prepended, and
//! the result can be published as a GitHub release through the `gh` CLI.

pub mod changelog;
pub mod error;
pub mod generator;
pub mod git;
pub mod release;
pub mod repository;
pub mod summary;

// Re-export commonly used types
pub use changelog::{CommitTree, ReleaseNotes, TreeKind};
pub use error::{GitError, ReleaseError, RenderError, SummaryError, TagError};
pub use generator::{DEFAULT_MAX_LENGTH, PreparedRelease, prepare_release};
pub use git::{Commit, TagMatcher, TagVersion, TargetRange};
pub use repository::RepositoryManager;
