//! Error types for changelog-generator modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Repository {} is bare", .0.display())]
    BareRepository(PathBuf),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to list tags: {0}")]
    ListTags(#[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to compute diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Invalid target '{0}': expected a 'rev1..rev2' range")]
    InvalidTarget(String),
}

/// Errors from tag version parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TagError {
    #[error("Not a valid tag: {0}")]
    InvalidTag(String),
}

/// Errors from the AI summarizer CLI.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Summarizer CLI '{0}' not found in PATH")]
    NotInstalled(String),

    #[error("Failed to spawn summarizer process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Summarizer failed to execute: {0}")]
    ExecutionFailed(String),

    #[error("Summarizer process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Summarizer exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Summarizer returned an empty summary")]
    EmptyResponse,

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<SummaryError>),
}

/// Errors from publishing release notes through the `gh` CLI.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("GitHub CLI (gh) not found. Install it from https://cli.github.com/")]
    NotInstalled,

    #[error("Failed to run gh {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("gh {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },
}

/// Errors from rendering and writing the changelog.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to serialize changelog: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),
}
