//! Changelog trees, trimming and rendering.

pub mod format;
pub mod trim;
pub mod writer;

pub use format::{CommitTree, TreeKind, build_trees, count_commits};
pub use trim::{RESERVED_LENGTH, TRIMMED_TREE_SIZE, trim_trees};
pub use writer::{ReleaseNotes, render_json, render_markdown, write_atomically};
