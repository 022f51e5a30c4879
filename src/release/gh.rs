//! GitHub release publishing through the `gh` CLI.
//!
//! Shells out to the system `gh` binary so the user's existing GitHub
//! authentication is reused. The release body is passed on stdin.

use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::ReleaseError;

/// GitHub refuses release bodies above this many characters.
pub const MAX_RELEASE_BODY_LENGTH: usize = 125_000;

/// What `publish_release` did with the release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Created,
    Updated,
    /// The release does not exist and creation was disabled.
    Skipped,
}

/// Handle on the `gh` binary.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::new("gh")
    }
}

impl GhCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that the binary is on the PATH.
    pub fn check_installed(&self) -> Result<(), ReleaseError> {
        which::which(&self.program)
            .map(|_| ())
            .map_err(|_| ReleaseError::NotInstalled)
    }

    /// Whether a release exists for `tag`.
    pub fn release_exists(&self, repo_path: &Path, tag: &str) -> Result<bool, ReleaseError> {
        let output = Command::new(&self.program)
            .args(["release", "view", tag])
            .current_dir(repo_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| ReleaseError::SpawnFailed {
                operation: "release view".to_string(),
                source,
            })?;

        Ok(output.success())
    }

    /// Run `gh <args>` in `repo_path` with `stdin` piped in.
    fn run(
        &self,
        repo_path: &Path,
        args: &[&str],
        stdin: &str,
        operation: &str,
    ) -> Result<(), ReleaseError> {
        let spawn_failed = |source| ReleaseError::SpawnFailed {
            operation: operation.to_string(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(repo_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_failed)?;

        // A child exiting without reading stdin is judged by its exit status.
        if let Some(mut pipe) = child.stdin.take()
            && let Err(e) = pipe.write_all(stdin.as_bytes())
            && e.kind() != ErrorKind::BrokenPipe
        {
            return Err(spawn_failed(e));
        }

        let output = child.wait_with_output().map_err(spawn_failed)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::CommandFailed {
                operation: operation.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Cap `body` at `max` characters, on a character boundary.
pub fn truncate_chars(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Create or update the GitHub release of `tag` with `body`.
///
/// When the release does not exist and `create` is false, nothing is done.
pub fn publish_release(
    cli: &GhCli,
    repo_path: &Path,
    tag: &str,
    body: &str,
    create: bool,
) -> Result<PublishOutcome, ReleaseError> {
    let body = truncate_chars(body, MAX_RELEASE_BODY_LENGTH);

    if cli.release_exists(repo_path, tag)? {
        debug!(tag = %tag, "Updating existing release");
        cli.run(repo_path, &["release", "edit", tag, "-F", "-"], body, "release edit")?;
        info!(tag = %tag, "Release updated");
        return Ok(PublishOutcome::Updated);
    }

    if !create {
        info!(tag = %tag, "Release does not exist, creation disabled");
        return Ok(PublishOutcome::Skipped);
    }

    let title = format!("Release {}", tag);
    cli.run(
        repo_path,
        &["release", "create", tag, "--title", &title, "-F", "-"],
        body,
        "release create",
    )?;
    info!(tag = %tag, "Release created");
    Ok(PublishOutcome::Created)
}
