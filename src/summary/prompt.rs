//! Prompt construction for the diff summary.

use std::env;

/// Environment variable replacing the built-in prompt.
pub const PROMPT_ENV_VAR: &str = "CHANGELOG_AI_PROMPT";

/// Build the summary prompt for a release, prioritizing files of `prefix`.
pub fn build_prompt(prefix: Option<&str>) -> String {
    let scope = match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!(
            "Give priority to changes in files related to `{prefix}` over changes in shared code."
        ),
        None => "Give priority to user-facing changes over internal refactoring.".to_string(),
    };

    format!(
        r#"Below is a `git diff` between two release tags. Summarize it concisely and precisely
using exactly the structure below. Do not add other sections.
{scope}

### Structure
1. **TL;DR**: the most significant changes, in a few lines.
2. **Functional Changes**: what changes for the services and their users, readable without technical knowledge.
3. **Possible Regressions**: concrete risks introduced by these changes. This section may be read during a production incident, so be specific and avoid generic statements.

### Constraints
- Use markdown that renders on both GitHub and Slack (bullet points, bold text, emojis where helpful).
- Describe high-level themes, not individual commits.
- Prefer clarity over a strict word limit, but stay concise.
- Do not guess the release name or version.
"#
    )
}

/// Prompt from `CHANGELOG_AI_PROMPT`, or the built-in one.
pub fn prompt_from_env(prefix: Option<&str>) -> String {
    match env::var(PROMPT_ENV_VAR) {
        Ok(prompt) if !prompt.trim().is_empty() => prompt,
        _ => build_prompt(prefix),
    }
}

/// Append the diff to the prompt.
pub fn with_diff(prompt: &str, diff: &str) -> String {
    format!("{}\n```diff\n{}\n```\n", prompt.trim_end(), sanitize_diff(diff))
}

/// Keep the diff from closing the fenced block it is wrapped in.
pub fn sanitize_diff(diff: &str) -> String {
    diff.replace("```", "'''")
}
