//! Exponential backoff retry around the summarizer CLI.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

use crate::error::SummaryError;

use super::subprocess::{get_command, get_timeout, run_summarizer};

/// 3 total attempts, base 1s, max 30s.
pub const MAX_ATTEMPTS: u32 = 3;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Trait for executing the summarizer.
///
/// This abstraction allows mocking the subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummaryExecutor: Send + Sync {
    /// Run the summarizer with the given prompt and return the raw response.
    async fn run(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Executor that calls the CLI named by `CHANGELOG_AI_COMMAND`.
pub struct DefaultExecutor {
    command: String,
    timeout: Duration,
}

impl DefaultExecutor {
    pub fn from_env() -> Self {
        Self {
            command: get_command(),
            timeout: get_timeout(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl SummaryExecutor for DefaultExecutor {
    async fn run(&self, prompt: &str) -> Result<String, SummaryError> {
        run_summarizer(&self.command, prompt, self.timeout).await
    }
}

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `MAX_ATTEMPTS` times; the last error is wrapped
/// in [`SummaryError::RetriesExhausted`].
pub async fn retry_with_backoff<T, Fut, F>(mut attempt: F) -> Result<T, SummaryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SummaryError>>,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;
    let mut last_error = SummaryError::EmptyResponse;

    while attempts < MAX_ATTEMPTS {
        attempts += 1;

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(attempt = attempts, error = %e, "Summarizer attempt failed");
                last_error = e;

                if attempts < MAX_ATTEMPTS
                    && let Some(wait_duration) = backoff.next_backoff()
                {
                    tokio::time::sleep(wait_duration).await;
                }
            }
        }
    }

    Err(SummaryError::RetriesExhausted(Box::new(last_error)))
}

/// Summarize with retries, returning the cleaned summary text.
pub async fn summarize_with_retry<E: SummaryExecutor + ?Sized>(
    prompt: &str,
    executor: &E,
) -> Result<String, SummaryError> {
    retry_with_backoff(|| async { try_summarize(prompt, executor).await }).await
}

/// Single summarization attempt.
async fn try_summarize<E: SummaryExecutor + ?Sized>(
    prompt: &str,
    executor: &E,
) -> Result<String, SummaryError> {
    let response = executor.run(prompt).await?;
    parse_response(&response)
}

/// JSON envelope printed with `--output-format json`.
#[derive(serde::Deserialize)]
struct CliEnvelope {
    result: String,
    #[serde(default)]
    is_error: bool,
}

/// Extract the summary text from the CLI output.
///
/// Falls back to the raw output when it is not a JSON envelope. Backticks are
/// replaced with single quotes so the summary cannot break the surrounding
/// markdown.
fn parse_response(response: &str) -> Result<String, SummaryError> {
    let content = match serde_json::from_str::<CliEnvelope>(response) {
        Ok(envelope) if envelope.is_error => {
            return Err(SummaryError::ExecutionFailed(envelope.result));
        }
        Ok(envelope) => envelope.result,
        Err(_) => response.to_string(),
    };

    let summary = content.trim().replace('`', "'");
    if summary.is_empty() {
        return Err(SummaryError::EmptyResponse);
    }
    Ok(summary)
}
