//! Assembles the review prompt sent to the AI reviewer.

use crate::error::RequestError;
use crate::limits::{REQUEST_DIFF_CEILING, REQUEST_SECTION_CAP, truncate_chars};

#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub prompt: String,
}

/// Build the review prompt. Task text and recent context are truncated to
/// their section cap; the diff-or-digest is never truncated here and instead
/// trips the circuit breaker when it exceeds the hard ceiling.
pub fn build_review_request(
    task_text: &str,
    context_text: &str,
    diff_text: &str,
    was_compressed: bool,
    docs_filtered: bool,
) -> Result<ReviewRequest, RequestError> {
    let diff_len = diff_text.chars().count();
    if diff_len > REQUEST_DIFF_CEILING {
        return Err(RequestError::DiffTooLarge {
            len: diff_len,
            limit: REQUEST_DIFF_CEILING,
        });
    }

    let task_text = truncate_chars(task_text, REQUEST_SECTION_CAP);
    let context_text = truncate_chars(context_text, REQUEST_SECTION_CAP);

    let diff_label = if was_compressed {
        "Summarized change sets (compressed from a larger diff)"
    } else {
        "Uncommitted diff"
    };
    let docs_note = if docs_filtered {
        "\nDocumentation-only file changes were removed from the diff before review.\n"
    } else {
        ""
    };

    let prompt = format!(
        r#"You are reviewing an AI coding assistant's uncommitted work against the active task's requirements.

## Task requirements

{task_text}

## Recent conversation context

{context_text}

## {diff_label}
{docs_note}
{diff_text}

## Your judgment

Classify the work with exactly one status:
- "on_track": the changes match the task requirements.
- "deviation": the changes drift from or contradict the task requirements.
- "needs_verification": the changes look plausible but claim results that were never tested or verified.
- "critical_failure": the changes are destructive or badly broken; continuing would make things worse.
- "review_failed": you cannot form a judgment from the material given.

Red flags that must lower your judgment:
- the assistant simplified or stubbed things out after hitting difficulty
- claims of success with no test or verification evidence
- edits outside the task's stated scope
- destructive file operations (deletions, overwrites) not called for by the task

Respond with a single JSON object and nothing else. No prose, no markdown fences. Schema:
{{"status": "<one of the five statuses>", "message": "<one or two sentences for the user>", "commitMessage": "<a conventional one-line commit message, or empty string if the work should not be committed>", "details": "<optional elaboration>"}}"#
    );

    Ok(ReviewRequest { prompt })
}
