//! Commit execution and the non-task suggestion heuristic.

use tracing::{info, warn};
use wd_vcs::VcsBackend;

use crate::limits::NON_TASK_STREAK_THRESHOLD;

const TASK_MARKER_PREFIX: &str = "[task ";

/// Stage and commit everything. Never raises past this boundary; a failed
/// commit is logged and reported as "did not commit".
pub fn commit_work(vcs: &dyn VcsBackend, message: &str) -> bool {
    match vcs.commit_all(message) {
        Ok(result) => {
            info!(commit = %result.id, message = %result.message, "committed work");
            true
        }
        Err(err) => {
            warn!(error = %err, "commit failed; work remains uncommitted");
            false
        }
    }
}

/// Append the `[task <id>]` marker when an id is known.
pub fn decorate_with_task(message: &str, task_id: Option<&str>) -> String {
    match task_id {
        Some(id) => format!("{message} {TASK_MARKER_PREFIX}{id}]"),
        None => message.to_string(),
    }
}

pub fn has_task_marker(summary: &str) -> bool {
    summary.contains(TASK_MARKER_PREFIX)
}

/// After a fresh non-task commit, suggest tracking the work as a task once
/// the newest commits form an unbroken non-task streak of threshold length.
/// Purely informational; any failure reads as "no suggestion".
pub fn should_suggest_task(vcs: &dyn VcsBackend, task_active: bool) -> bool {
    if task_active {
        return false;
    }
    match vcs.log(NON_TASK_STREAK_THRESHOLD) {
        Ok(entries) => {
            entries.len() >= NON_TASK_STREAK_THRESHOLD
                && entries.iter().all(|entry| !has_task_marker(&entry.summary))
        }
        Err(err) => {
            warn!(error = %err, "could not read commit log for task suggestion");
            false
        }
    }
}
