//! Commit categories and tree construction.

use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::git::Commit;

/// Changelog categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Doc,
    Features,
    Fixes,
    Revert,
    Others,
}

impl TreeKind {
    /// Display order.
    pub const ALL: [TreeKind; 5] = [
        TreeKind::Doc,
        TreeKind::Features,
        TreeKind::Fixes,
        TreeKind::Revert,
        TreeKind::Others,
    ];

    /// Least important first: the order in which categories are cut.
    pub const TRIM_ORDER: [TreeKind; 5] = [
        TreeKind::Others,
        TreeKind::Revert,
        TreeKind::Doc,
        TreeKind::Fixes,
        TreeKind::Features,
    ];

    /// Stable short identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Features => "features",
            Self::Fixes => "fixes",
            Self::Revert => "revert",
            Self::Others => "others",
        }
    }

    /// Section title used by the renderer.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Doc => ":notebook_with_decorative_cover: Documentation",
            Self::Features => ":rocket: Features",
            Self::Fixes => ":bug: Fixes",
            Self::Revert => ":scream: Revert",
            Self::Others => ":nut_and_bolt: Others",
        }
    }

    /// Category for a commit type. Anything that is not docs, feat, fix or
    /// revert (including `unknown`) lands in others.
    pub fn for_commit_type(commit_type: &str) -> Self {
        match commit_type {
            "docs" => Self::Doc,
            "feat" => Self::Features,
            "fix" => Self::Fixes,
            "revert" => Self::Revert,
            _ => Self::Others,
        }
    }
}

/// A category and its commits, sorted by scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTree {
    pub kind: TreeKind,
    pub commits: Vec<Commit>,
}

impl CommitTree {
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

impl Serialize for CommitTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CommitTree", 3)?;
        state.serialize_field("id", self.id())?;
        state.serialize_field("title", self.title())?;
        state.serialize_field("commits", &self.commits)?;
        state.end()
    }
}

/// Group commits into the non-empty categories, in display order.
///
/// Commits keep their fetch order among equal scopes.
pub fn build_trees(commits: &[Commit]) -> Vec<CommitTree> {
    TreeKind::ALL
        .iter()
        .filter_map(|&kind| {
            let mut grouped: Vec<Commit> = commits
                .iter()
                .filter(|c| TreeKind::for_commit_type(&c.commit_type) == kind)
                .cloned()
                .collect();

            if grouped.is_empty() {
                return None;
            }

            grouped.sort_by(|a, b| a.scope.cmp(&b.scope));
            Some(CommitTree {
                kind,
                commits: grouped,
            })
        })
        .collect()
}

/// Number of commits across all trees.
pub fn count_commits(trees: &[CommitTree]) -> usize {
    trees.iter().map(CommitTree::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(summary: &str) -> Commit {
        Commit::new("", summary, summary)
    }

    #[test]
    fn test_empty_commits_build_no_trees() {
        assert!(build_trees(&[]).is_empty());
    }

    #[test]
    fn test_trees_in_fixed_order_and_non_empty() {
        let commits = vec![
            commit("chore(ci): bump runner"),
            commit("fix(api): handle timeout"),
            commit("docs(readme): typo"),
            commit("random text"),
        ];

        let trees = build_trees(&commits);
        let ids: Vec<&str> = trees.iter().map(CommitTree::id).collect();
        assert_eq!(ids, vec!["doc", "fixes", "others"]);
        assert_eq!(trees[2].len(), 2);
    }

    #[test]
    fn test_unknown_and_custom_types_go_to_others() {
        let commits = vec![commit("random text"), commit("perf(db): index")];
        let trees = build_trees(&commits);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].kind, TreeKind::Others);
    }

    #[test]
    fn test_revert_commits_have_their_own_tree() {
        let trees = build_trees(&[commit("Revert: feat(auth): add login")]);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].kind, TreeKind::Revert);
    }

    #[test]
    fn test_sorted_by_scope_and_stable() {
        let commits = vec![
            commit("feat(zeta): one"),
            commit("feat(alpha): two"),
            commit("feat(beta): three"),
            commit("feat(alpha): four"),
        ];

        let trees = build_trees(&commits);
        let subjects: Vec<&str> = trees[0].commits.iter().map(|c| c.subject.as_str()).collect();
        assert_eq!(subjects, vec!["two", "four", "three", "one"]);
    }

    #[test]
    fn test_any_scope_sorts_lexicographically() {
        let commits = vec![
            commit("feat(billing): one"),
            commit("feat(api): two"),
            Commit::new("", "Revert plain", ""),
        ];
        let trees = build_trees(&commits);
        let scopes: Vec<&str> = trees[0].commits.iter().map(|c| c.scope.as_str()).collect();
        assert_eq!(scopes, vec!["api", "billing"]);
        assert_eq!(trees[1].commits[0].scope, "any");
    }

    #[test]
    fn test_count_commits() {
        let commits = vec![commit("feat(a): x"), commit("fix(b): y"), commit("z")];
        assert_eq!(count_commits(&build_trees(&commits)), 3);
    }

    #[test]
    fn test_tree_serializes_id_and_title() {
        let trees = build_trees(&[commit("docs(guide): add section")]);
        let json = serde_json::to_value(&trees[0]).unwrap();
        assert_eq!(json["id"], "doc");
        assert_eq!(json["title"], ":notebook_with_decorative_cover: Documentation");
        assert_eq!(json["commits"][0]["scope"], "guide");
    }
}
