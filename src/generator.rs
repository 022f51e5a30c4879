//! From repository state to renderable release notes.

use tracing::{debug, info, warn};

use crate::changelog::{ReleaseNotes, build_trees, trim_trees};
use crate::error::GitError;
use crate::git::{RangeDiff, TargetRange};
use crate::repository::{RepositoryManager, compare_url};

/// Default length budget for a rendered changelog.
pub const DEFAULT_MAX_LENGTH: usize = 2000;

/// Release notes plus the diff to summarize, when one is available.
#[derive(Debug, Clone)]
pub struct PreparedRelease {
    pub notes: ReleaseNotes,
    pub diff: Option<RangeDiff>,
}

/// Collect, classify, group and trim the commits of one release.
///
/// Without a target the range is the previous release tag to the current one
/// and the diff between them is attached. With an explicit target its two ends
/// are used as tags and no diff is produced.
pub fn prepare_release(
    manager: &RepositoryManager,
    target: Option<&TargetRange>,
    max_length: usize,
) -> Result<PreparedRelease, GitError> {
    let (commits, previous_tag, current_tag, diff) = match target {
        Some(target) => (
            manager.commits_in_target(target)?,
            target.from_ref.clone(),
            target.to_ref.clone(),
            None,
        ),
        None => {
            let diff = match manager.diff_since_last_tag() {
                Ok(Some(diff)) => {
                    if diff.truncated {
                        warn!(files = diff.files_changed, "Diff truncated for the AI summary");
                    } else {
                        debug!(files = diff.files_changed, "Diff collected for the AI summary");
                    }
                    Some(diff)
                }
                Ok(None) => None,
                Err(e) => {
                    warn!(error = %e, "Could not compute diff since last tag");
                    None
                }
            };
            (
                manager.commits_since_last_tag()?.to_vec(),
                manager.previous_tag()?.to_string(),
                manager.current_tag()?.to_string(),
                diff,
            )
        }
    };

    let total = commits.len();
    let mut commit_trees = build_trees(&commits);
    let kept = trim_trees(&mut commit_trees, total, max_length);
    if kept < total {
        info!(total, kept, max_length, "Changelog trimmed to fit length budget");
    }

    let link = compare_url(manager.identity(), &previous_tag, &current_tag);

    let notes = ReleaseNotes {
        organization: manager.organization().to_string(),
        repository: manager.name().to_string(),
        released_at: manager.release_date(&current_tag),
        previous_tag,
        current_tag,
        commit_trees,
        link,
        ai_summary: None,
    };

    Ok(PreparedRelease { notes, diff })
}
