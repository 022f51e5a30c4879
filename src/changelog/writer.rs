//! Render release notes and write them out.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::RenderError;
use crate::git::Commit;
use crate::git::commits::ANY_SCOPE;

use super::format::{CommitTree, count_commits};

/// Everything the renderer needs for one release.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseNotes {
    pub organization: String,
    pub repository: String,
    pub previous_tag: String,
    pub current_tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<DateTime<Utc>>,
    pub commit_trees: Vec<CommitTree>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

impl ReleaseNotes {
    pub fn commit_count(&self) -> usize {
        count_commits(&self.commit_trees)
    }

    fn commit_url(&self, commit: &Commit) -> Option<String> {
        if self.organization.is_empty() || self.repository.is_empty() || commit.hash.is_empty() {
            return None;
        }
        Some(format!(
            "https://github.com/{}/{}/commit/{}",
            self.organization, self.repository, commit.hash
        ))
    }
}

/// Render the notes as GitHub-flavored markdown.
pub fn render_markdown(notes: &ReleaseNotes) -> String {
    let mut out = match notes.released_at {
        Some(date) => format!("# {} ({})\n\n", notes.current_tag, date.format("%Y-%m-%d")),
        None => format!("# {}\n\n", notes.current_tag),
    };

    if !notes.previous_tag.is_empty() {
        match &notes.link {
            Some(link) => {
                out.push_str(&format!("Changes since [{}]({})\n\n", notes.previous_tag, link));
            }
            None => out.push_str(&format!("Changes since {}\n\n", notes.previous_tag)),
        }
    }

    if let Some(summary) = notes.ai_summary.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str("## :robot: Summary\n\n");
        out.push_str(summary.trim());
        out.push_str("\n\n");
    }

    for tree in &notes.commit_trees {
        out.push_str(&format!("## {}\n\n", tree.title()));
        for commit in &tree.commits {
            out.push_str(&format_commit_line(notes, commit));
            out.push('\n');
        }
        out.push('\n');
    }

    if notes.commit_trees.is_empty() {
        out.push_str("No changes.\n");
    }

    out
}

fn format_commit_line(notes: &ReleaseNotes, commit: &Commit) -> String {
    let mut line = String::from("- ");

    if commit.scope != ANY_SCOPE {
        line.push_str(&format!("**{}**: ", commit.scope));
    }
    line.push_str(&commit.subject);

    if !commit.short.is_empty() {
        match notes.commit_url(commit) {
            Some(url) => line.push_str(&format!(" ([{}]({}))", commit.short, url)),
            None => line.push_str(&format!(" ({})", commit.short)),
        }
    }

    if !commit.jiras.is_empty() {
        line.push_str(&format!(" {}", commit.jiras.join(", ")));
    }

    line
}

/// Render the notes as pretty JSON.
pub fn render_json(notes: &ReleaseNotes) -> Result<String, RenderError> {
    serde_json::to_string_pretty(notes).map_err(RenderError::Serialize)
}

/// Write `content` to `path` through a temp file in the same directory.
pub fn write_atomically(path: &Path, content: &str) -> Result<(), RenderError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(RenderError::WriteFailed)?;
    file.write_all(content.as_bytes())
        .map_err(RenderError::WriteFailed)?;
    file.persist(path)
        .map_err(|e| RenderError::WriteFailed(e.error))?;

    Ok(())
}
