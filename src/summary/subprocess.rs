//! Summarizer CLI spawning.

use std::env;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::error::SummaryError;

/// Default timeout for the summarizer subprocess (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable to override the default timeout.
pub const TIMEOUT_ENV_VAR: &str = "CHANGELOG_AI_TIMEOUT";

/// Environment variable naming the summarizer binary.
pub const COMMAND_ENV_VAR: &str = "CHANGELOG_AI_COMMAND";

/// Summarizer binary used when `CHANGELOG_AI_COMMAND` is unset.
pub const DEFAULT_COMMAND: &str = "claude";

/// Get the configured timeout duration.
///
/// Logs a warning if the environment variable is set but is not a number of
/// seconds.
pub fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Summarizer binary from the environment, or [`DEFAULT_COMMAND`].
pub fn get_command() -> String {
    match env::var(COMMAND_ENV_VAR) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => DEFAULT_COMMAND.to_string(),
    }
}

/// Check that the summarizer CLI is on the PATH.
pub fn check_installed(command: &str) -> Result<(), SummaryError> {
    which::which(command)
        .map(|_| ())
        .map_err(|_| SummaryError::NotInstalled(command.to_string()))
}

/// Run the summarizer with a prompt and return its raw stdout.
///
/// Invoked as `<command> -p <prompt> --output-format json`.
pub async fn run_summarizer(
    command: &str,
    prompt: &str,
    timeout_duration: Duration,
) -> Result<String, SummaryError> {
    let timeout_secs = timeout_duration.as_secs();

    let output = timeout(
        timeout_duration,
        Command::new(command)
            .arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("json")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| SummaryError::Timeout(timeout_secs))?
    .map_err(SummaryError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(SummaryError::NonZeroExit { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
