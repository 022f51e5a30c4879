//! Git operations using git2-rs.

pub mod commits;
pub mod diff;
pub mod range;
pub mod remote;
pub mod tags;

pub use commits::{Commit, extract_jiras, fetch_commits, parse_header};
pub use diff::{RangeDiff, diff_between};
pub use range::{TargetRange, resolve_reference};
pub use remote::{RemoteIdentity, origin_identity, parse_github_remote};
pub use tags::{
    PrefixedTagMatcher, SimpleTagMatcher, TagMatcher, TagVersion, list_merged_tags, matcher_for,
    tag_target,
};
