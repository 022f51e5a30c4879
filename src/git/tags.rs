//! Release tag matching and enumeration.

use std::fmt;
use std::sync::LazyLock;

use git2::{Oid, Repository};
use regex_lite::{Captures, Regex};
use tracing::{debug, warn};

use crate::error::{GitError, TagError};

/// Matches `1.2.3`, `1-2-3`, `v1.2.3`, `1.2.` and `1.2.rc1`.
static SIMPLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(?P<major>\d+)[-.](?P<minor>\d+)[-.]((?P<bug>\d+)|rc(?P<rc>\d+))?$")
        .expect("Invalid simple tag regex")
});

/// Matches `service/1.2.3` and `service/1.2.rc1`.
static PREFIXED_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<prefix>[\w-]+)/(?P<major>\d+)\.(?P<minor>\d+)\.((?P<bug>\d+)|rc(?P<rc>\d+))?$",
    )
    .expect("Invalid prefixed tag regex")
});

/// Version key extracted from a tag: `(major, minor, bug, rc)`.
///
/// Field order is the comparison order, so the derived `Ord` compares tags
/// the same way a `(major, minor, bug, rc)` tuple would. `rc == 0` means
/// a final release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagVersion {
    pub major: u64,
    pub minor: u64,
    pub bug: u64,
    pub rc: u64,
}

impl TagVersion {
    pub fn new(major: u64, minor: u64, bug: u64, rc: u64) -> Self {
        Self {
            major,
            minor,
            bug,
            rc,
        }
    }

    pub fn is_release_candidate(&self) -> bool {
        self.rc != 0
    }
}

impl fmt::Display for TagVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_release_candidate() {
            write!(f, "{}.{}.rc{}", self.major, self.minor, self.rc)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.bug)
        }
    }
}

/// Tag validation strategy.
pub trait TagMatcher {
    /// Parse a tag into its version key.
    fn parse(&self, tag: &str) -> Result<TagVersion, TagError>;

    /// Glob used to narrow `git tag` listing, if any.
    fn glob(&self) -> Option<String> {
        None
    }

    /// A release tag matches the pattern and is not a release candidate.
    fn is_release_tag(&self, tag: &str) -> bool {
        self.parse(tag).is_ok_and(|version| !version.is_release_candidate())
    }

    /// Keep only release tags, newest first.
    fn release_tags(&self, tags: &[String]) -> Vec<String> {
        let mut versioned: Vec<(TagVersion, &String)> = tags
            .iter()
            .filter_map(|tag| match self.parse(tag) {
                Ok(version) if version.is_release_candidate() => {
                    debug!(tag = %tag, version = %version, "Skipping release candidate");
                    None
                }
                Ok(version) => Some((version, tag)),
                Err(_) => None,
            })
            .collect();

        versioned.sort_by(|a, b| b.0.cmp(&a.0));
        versioned.into_iter().map(|(_, tag)| tag.clone()).collect()
    }
}

/// Tags without a service namespace (`v1.2.3`, `1-2-3`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTagMatcher;

impl TagMatcher for SimpleTagMatcher {
    fn parse(&self, tag: &str) -> Result<TagVersion, TagError> {
        let caps = SIMPLE_TAG_RE
            .captures(tag)
            .ok_or_else(|| TagError::InvalidTag(tag.to_string()))?;
        version_from_captures(tag, &caps)
    }
}

/// Tags namespaced by a service prefix (`billing/1.2.3`).
#[derive(Debug, Clone)]
pub struct PrefixedTagMatcher {
    prefix: String,
}

impl PrefixedTagMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl TagMatcher for PrefixedTagMatcher {
    fn parse(&self, tag: &str) -> Result<TagVersion, TagError> {
        let caps = PREFIXED_TAG_RE
            .captures(tag)
            .filter(|caps| &caps["prefix"] == self.prefix)
            .ok_or_else(|| TagError::InvalidTag(tag.to_string()))?;
        version_from_captures(tag, &caps)
    }

    fn glob(&self) -> Option<String> {
        Some(format!("{}/*", self.prefix))
    }
}

/// Pick the matcher for an optional prefix.
pub fn matcher_for(prefix: Option<&str>) -> Box<dyn TagMatcher> {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => Box::new(PrefixedTagMatcher::new(prefix)),
        None => Box::new(SimpleTagMatcher),
    }
}

fn version_from_captures(tag: &str, caps: &Captures<'_>) -> Result<TagVersion, TagError> {
    let number = |name: &str| -> Result<u64, TagError> {
        match caps.name(name) {
            Some(m) => m
                .as_str()
                .parse::<u64>()
                .map_err(|_| TagError::InvalidTag(tag.to_string())),
            None => Ok(0),
        }
    };

    Ok(TagVersion::new(
        number("major")?,
        number("minor")?,
        number("bug")?,
        number("rc")?,
    ))
}

/// List the tags whose target commit is reachable from HEAD (`git tag --merged`).
///
/// An unborn HEAD yields no tags.
pub fn list_merged_tags(repo: &Repository, glob: Option<&str>) -> Result<Vec<String>, GitError> {
    let head_oid = match repo.head().ok().and_then(|head| head.target()) {
        Some(oid) => oid,
        None => {
            debug!("HEAD has no target, no tags can be merged");
            return Ok(Vec::new());
        }
    };

    let names = repo.tag_names(glob).map_err(GitError::ListTags)?;
    let mut merged = Vec::new();

    for name in names.iter() {
        let Some(name) = name else {
            warn!("Skipping tag with a name that is not valid UTF-8");
            continue;
        };

        let target = match tag_target(repo, name) {
            Ok(oid) => oid,
            Err(e) => {
                debug!(tag = %name, error = %e, "Skipping tag that does not point to a commit");
                continue;
            }
        };

        let reachable = target == head_oid
            || repo
                .graph_descendant_of(head_oid, target)
                .map_err(GitError::RevwalkError)?;

        if reachable {
            merged.push(name.to_string());
        }
    }

    Ok(merged)
}

/// Resolve a tag name to the commit it points to (annotated tags are peeled).
pub fn tag_target(repo: &Repository, name: &str) -> Result<Oid, GitError> {
    let reference_name = format!("refs/tags/{}", name);
    let reference = repo
        .find_reference(&reference_name)
        .map_err(|e| GitError::ReferenceNotFound(name.to_string(), e))?;
    let commit = reference.peel_to_commit().map_err(GitError::ParseCommit)?;
    Ok(commit.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_parse_dotted() {
        let version = SimpleTagMatcher.parse("1.2.3").unwrap();
        assert_eq!(version, TagVersion::new(1, 2, 3, 0));
    }

    #[test]
    fn test_simple_parse_with_v_and_dashes() {
        assert_eq!(
            SimpleTagMatcher.parse("v10-4-7").unwrap(),
            TagVersion::new(10, 4, 7, 0)
        );
        assert_eq!(
            SimpleTagMatcher.parse("v1.2-3").unwrap(),
            TagVersion::new(1, 2, 3, 0)
        );
    }

    #[test]
    fn test_simple_parse_missing_bug_is_zero() {
        assert_eq!(
            SimpleTagMatcher.parse("1.2.").unwrap(),
            TagVersion::new(1, 2, 0, 0)
        );
    }

    #[test]
    fn test_simple_parse_release_candidate() {
        let version = SimpleTagMatcher.parse("1.2.rc4").unwrap();
        assert_eq!(version, TagVersion::new(1, 2, 0, 4));
        assert!(!SimpleTagMatcher.is_release_tag("1.2.rc4"));
    }

    #[test]
    fn test_simple_parse_invalid() {
        for tag in ["", "release", "1.2", "1.2.3.4", "V1.2.3", "x1.2.3", "1.2.3rc1"] {
            assert_eq!(
                SimpleTagMatcher.parse(tag),
                Err(TagError::InvalidTag(tag.to_string())),
                "expected {tag:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_prefixed_parse_requires_exact_prefix() {
        let matcher = PrefixedTagMatcher::new("cms");
        assert_eq!(matcher.parse("cms/7.5.0").unwrap(), TagVersion::new(7, 5, 0, 0));
        assert!(matcher.parse("CMS/7.5.0").is_err());
        assert!(matcher.parse("monolite/7.5.0").is_err());
        assert!(matcher.parse("cms-api/7.5.0").is_err());
    }

    #[test]
    fn test_prefixed_rejects_dash_separators() {
        let matcher = PrefixedTagMatcher::new("cms");
        assert!(matcher.parse("cms/7-5-0").is_err());
        assert!(matcher.parse("7.5.0").is_err());
    }

    #[test]
    fn test_prefixed_release_candidate_is_not_release() {
        let matcher = PrefixedTagMatcher::new("my-service");
        assert!(matcher.is_release_tag("my-service/1.0.2"));
        assert!(!matcher.is_release_tag("my-service/1.0.rc2"));
    }

    #[test]
    fn test_prefixed_glob() {
        assert_eq!(PrefixedTagMatcher::new("cms").glob(), Some("cms/*".to_string()));
        assert_eq!(SimpleTagMatcher.glob(), None);
    }

    #[test]
    fn test_release_tags_sorted_descending_without_candidates() {
        let tags: Vec<String> =
            ["1.2.3", "1.10.0", "v1.9.9", "2.0.rc1", "nightly", "0.9.0", "2-0-0"]
                .into_iter()
                .map(String::from)
                .collect();
        let sorted = SimpleTagMatcher.release_tags(&tags);
        assert_eq!(sorted, vec!["2-0-0", "1.10.0", "v1.9.9", "1.2.3", "0.9.0"]);
    }

    #[test]
    fn test_ordering_is_transitive_and_stable() {
        let a = SimpleTagMatcher.parse("1.2.3").unwrap();
        let b = SimpleTagMatcher.parse("1.2.10").unwrap();
        let c = SimpleTagMatcher.parse("1.3.0").unwrap();
        assert!(a < b && b < c && a < c);
        assert_eq!(SimpleTagMatcher.parse("1.2.3").unwrap(), a);
    }

    #[test]
    fn test_matcher_for_prefix() {
        let simple = matcher_for(None);
        assert!(simple.is_release_tag("v1.0.0"));
        assert_eq!(simple.glob(), None);

        let empty = matcher_for(Some(""));
        assert!(empty.is_release_tag("v1.0.0"));

        let prefixed = matcher_for(Some("cms"));
        assert!(prefixed.is_release_tag("cms/1.0.0"));
        assert!(!prefixed.is_release_tag("v1.0.0"));
        assert_eq!(prefixed.glob(), Some("cms/*".to_string()));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(TagVersion::new(1, 2, 3, 0).to_string(), "1.2.3");
        assert_eq!(TagVersion::new(1, 2, 0, 5).to_string(), "1.2.rc5");
    }
}
