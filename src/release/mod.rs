//! Publishing release notes to GitHub releases.

pub mod gh;

pub use gh::{GhCli, MAX_RELEASE_BODY_LENGTH, PublishOutcome, publish_release, truncate_chars};

use crate::git::TargetRange;

/// Consecutive release ranges, oldest first.
///
/// `tags` is newest first, as returned by the repository manager.
pub fn release_pairs(tags: &[String]) -> Vec<TargetRange> {
    tags.windows(2)
        .rev()
        .map(|pair| TargetRange {
            from_ref: pair[1].clone(),
            to_ref: pair[0].clone(),
        })
        .collect()
}
