//! AI summary of the diff between two release tags.

pub mod prompt;
pub mod retry;
pub mod subprocess;

use tracing::{error, info, warn};

pub use prompt::{build_prompt, prompt_from_env, with_diff};
pub use retry::{DefaultExecutor, SummaryExecutor, summarize_with_retry};
pub use subprocess::{check_installed, run_summarizer};

/// Summary used when the diff between the tags is empty.
pub const NO_DIFF_SUMMARY: &str = "No changes were provided in the diff";

/// Summarize `diff`, prioritizing files of `prefix`.
///
/// Never fails: `None` when there is no diff or the summarizer gave up, so the
/// changelog is still rendered without a summary.
pub async fn generate_ai_summary<E: SummaryExecutor + ?Sized>(
    executor: &E,
    prefix: Option<&str>,
    diff: Option<&str>,
) -> Option<String> {
    let diff = diff?;
    if diff.trim().is_empty() {
        return Some(NO_DIFF_SUMMARY.to_string());
    }

    let prompt = with_diff(&prompt_from_env(prefix), diff);
    info!(diff_length = diff.len(), "Requesting AI summary");

    match summarize_with_retry(&prompt, executor).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            error!(error = %e, "AI summary failed");
            warn!("Rendering changelog without AI summary");
            None
        }
    }
}
