//! Length-budget trimming of commit trees.

use tracing::info;

use super::format::{CommitTree, TreeKind};

/// Length reserved for headers and markup around the commit lines.
pub const RESERVED_LENGTH: usize = 200;

/// Number of commits kept in a category once it has been cut.
pub const TRIMMED_TREE_SIZE: usize = 10;

/// Cut categories, least important first, until the commit count fits.
///
/// The budget is `max_length - RESERVED_LENGTH`. Each category is visited at
/// most once, in [`TreeKind::TRIM_ORDER`]; a visited category longer than
/// [`TRIMMED_TREE_SIZE`] keeps only its first commits. Visiting stops as soon
/// as the running total fits. Returns the running total.
pub fn trim_trees(trees: &mut [CommitTree], total_commits: usize, max_length: usize) -> usize {
    let budget = max_length.saturating_sub(RESERVED_LENGTH);
    let mut remaining = total_commits;

    for kind in TreeKind::TRIM_ORDER {
        if remaining <= budget {
            break;
        }

        let Some(tree) = trees.iter_mut().find(|t| t.kind == kind) else {
            continue;
        };

        let size = tree.commits.len();
        if size <= TRIMMED_TREE_SIZE {
            continue;
        }

        tree.commits.truncate(TRIMMED_TREE_SIZE);
        remaining = remaining.saturating_sub(size - TRIMMED_TREE_SIZE);

        info!(
            tree = kind.id(),
            removed = size - TRIMMED_TREE_SIZE,
            remaining,
            budget,
            "Trimmed changelog category"
        );
    }

    remaining
}
