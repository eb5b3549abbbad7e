//! The review cycle: one pass per stop event, from working-tree inspection
//! to session-control decision. Every degraded path lands on a verdict that
//! preserves the work; the engine never raises past `run`.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{Instrument, info, info_span, warn};
use ulid::Ulid;
use wd_vcs::VcsBackend;

use crate::agent::{CommitMessenger, Reviewer, Summarizer};
use crate::commit::{commit_work, decorate_with_task, should_suggest_task};
use crate::compress::compress_if_large;
use crate::config::WardenConfig;
use crate::diff::{DiffBundle, split_reviewable};
use crate::error::{AgentError, WardenError};
use crate::limits::REQUEST_SECTION_CAP;
use crate::policy::{SessionControl, decide};
use crate::request::build_review_request;
use crate::tasks::{ActiveTask, TaskSource};
use crate::transcript::recent_context;
use crate::verdict::{ReviewStatus, ReviewVerdict, normalize_response};

const EXPLORATORY_FALLBACK: &str = "chore: exploratory work in progress";
const DOCS_COMMIT_MESSAGE: &str = "docs: update documentation";
const DEGRADED_COMMIT_MESSAGE: &str = "wip: checkpoint (review unavailable)";
const SUGGESTION_NOTE: &str = "the last few commits have no tracked task; consider creating one under .tasks/ so reviews have a requirements baseline";

#[derive(Debug, Clone)]
pub struct CycleInput {
    pub workdir: PathBuf,
    pub transcript_path: Option<PathBuf>,
    /// True when the host is re-invoking after a prior block.
    pub stop_hook_active: bool,
}

#[derive(Debug)]
pub struct CycleOutcome {
    pub control: SessionControl,
    pub verdict: Option<ReviewVerdict>,
    pub committed: bool,
    pub suggestion: Option<String>,
}

impl CycleOutcome {
    /// Plain allow with a note; used when there is nothing to review.
    pub fn informational(note: impl Into<String>) -> Self {
        Self {
            control: SessionControl::allow(note),
            verdict: None,
            committed: false,
            suggestion: None,
        }
    }
}

pub struct ReviewEngine<S, R, G> {
    vcs: Box<dyn VcsBackend>,
    tasks: Box<dyn TaskSource>,
    summarizer: S,
    reviewer: R,
    commit_messenger: G,
    config: WardenConfig,
}

impl<S, R, G> ReviewEngine<S, R, G>
where
    S: Summarizer,
    R: Reviewer,
    G: CommitMessenger,
{
    pub fn new(
        vcs: Box<dyn VcsBackend>,
        tasks: Box<dyn TaskSource>,
        summarizer: S,
        reviewer: R,
        commit_messenger: G,
        config: WardenConfig,
    ) -> Self {
        Self {
            vcs,
            tasks,
            summarizer,
            reviewer,
            commit_messenger,
            config,
        }
    }

    pub async fn run(&self, input: &CycleInput) -> CycleOutcome {
        let cycle = Ulid::new();
        let span = info_span!("review_cycle", cycle = %cycle);
        self.run_inner(input).instrument(span).await
    }

    async fn run_inner(&self, input: &CycleInput) -> CycleOutcome {
        // Stage first so untracked files show up in both the change check
        // and the diff.
        if let Err(err) = self.vcs.stage_all() {
            warn!(error = %err, "could not stage changes");
            return CycleOutcome::informational("unable to stage working tree changes");
        }
        let status = match self.vcs.status() {
            Ok(status) => status,
            Err(err) => {
                warn!(error = %err, "could not read working tree status");
                return CycleOutcome::informational("unable to inspect the working tree");
            }
        };
        if !status.has_changes() {
            return CycleOutcome::informational("no uncommitted changes");
        }

        let diff = match self.vcs.diff_uncommitted() {
            Ok(diff) => diff,
            Err(err) => {
                warn!(error = %err, "could not read diff");
                return CycleOutcome::informational("unable to read the uncommitted diff");
            }
        };
        let bundle = split_reviewable(&diff);

        let task = match self.tasks.active_task(&input.workdir) {
            Ok(task) => task,
            Err(err) => {
                warn!(error = %err, "task lookup failed; treating as no active task");
                None
            }
        };

        match task {
            None => self.exploratory_cycle(input, &bundle).await,
            Some(task) if bundle.doc_only_changes => self.docs_only_cycle(input, &task),
            Some(task) => self.reviewed_cycle(input, &task, &bundle).await,
        }
    }

    /// No active task: no review, just a best-effort commit so the work is
    /// kept, plus the task-tracking nudge when warranted.
    async fn exploratory_cycle(&self, input: &CycleInput, bundle: &DiffBundle) -> CycleOutcome {
        let diff = if bundle.filtered_diff.is_empty() {
            &bundle.full_diff
        } else {
            &bundle.filtered_diff
        };

        let secs = self.config.summary_timeout_secs;
        let generated = tokio::time::timeout(
            Duration::from_secs(secs),
            self.commit_messenger.commit_message(diff, None),
        )
        .await;
        let commit_message = match generated {
            Ok(Ok(message)) if !message.trim().is_empty() => message.trim().to_string(),
            Ok(Ok(_)) | Ok(Err(_)) | Err(_) => {
                warn!("commit message generation failed; using fallback");
                EXPLORATORY_FALLBACK.to_string()
            }
        };

        let verdict = ReviewVerdict {
            status: ReviewStatus::OnTrack,
            message: "no active task; committed the work as exploratory".to_string(),
            commit_message,
            details: None,
        };
        let committed = commit_work(self.vcs.as_ref(), &verdict.commit_message);
        let suggestion = (committed && should_suggest_task(self.vcs.as_ref(), false))
            .then(|| SUGGESTION_NOTE.to_string());
        let control = decide(&verdict, input.stop_hook_active);

        CycleOutcome {
            control,
            verdict: Some(verdict),
            committed,
            suggestion,
        }
    }

    /// Documentation-only change sets are auto-approved without an AI call.
    fn docs_only_cycle(&self, input: &CycleInput, task: &ActiveTask) -> CycleOutcome {
        let verdict = ReviewVerdict {
            status: ReviewStatus::OnTrack,
            message: "documentation-only changes; auto-approved".to_string(),
            commit_message: decorate_with_task(DOCS_COMMIT_MESSAGE, task.id.as_deref()),
            details: None,
        };
        let committed = commit_work(self.vcs.as_ref(), &verdict.commit_message);
        let control = decide(&verdict, input.stop_hook_active);

        CycleOutcome {
            control,
            verdict: Some(verdict),
            committed,
            suggestion: None,
        }
    }

    async fn reviewed_cycle(
        &self,
        input: &CycleInput,
        task: &ActiveTask,
        bundle: &DiffBundle,
    ) -> CycleOutcome {
        let verdict = match self.review_against_task(input, task, bundle).await {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!(error = %err, "review degraded");
                ReviewVerdict {
                    status: ReviewStatus::ReviewFailed,
                    message: format!("review unavailable: {err}"),
                    commit_message: decorate_with_task(
                        DEGRADED_COMMIT_MESSAGE,
                        task.id.as_deref(),
                    ),
                    details: None,
                }
            }
        };

        let committed = if verdict.commit_message.trim().is_empty() {
            false
        } else {
            commit_work(self.vcs.as_ref(), &verdict.commit_message)
        };
        let control = decide(&verdict, input.stop_hook_active);

        CycleOutcome {
            control,
            verdict: Some(verdict),
            committed,
            suggestion: None,
        }
    }

    /// The fallible half of a reviewed cycle. Any error here is mapped to a
    /// `review_failed` verdict by the caller.
    async fn review_against_task(
        &self,
        input: &CycleInput,
        task: &ActiveTask,
        bundle: &DiffBundle,
    ) -> Result<ReviewVerdict, WardenError> {
        let compression = compress_if_large(&self.summarizer, &bundle.filtered_diff).await;
        if compression.compressed {
            info!(ratio = compression.ratio, "compressed diff for review");
        }

        let since = self
            .vcs
            .log(1)
            .ok()
            .and_then(|entries| entries.first().map(|entry| entry.timestamp));
        let context = match &input.transcript_path {
            Some(path) => recent_context(path, since, REQUEST_SECTION_CAP)?.text,
            None => String::new(),
        };

        let request = build_review_request(
            &task.content,
            &context,
            &compression.text,
            compression.compressed,
            bundle.has_doc_changes,
        )?;

        let secs = self.config.review_timeout_secs;
        let raw = tokio::time::timeout(
            Duration::from_secs(secs),
            self.reviewer.review(&request.prompt),
        )
        .await
        .map_err(|_| AgentError::Timeout { secs })?
        .map_err(WardenError::from)?;

        let normalized = normalize_response(&raw).ok_or(AgentError::Failed {
            reason: "reviewer response contained no parsable verdict".to_string(),
        })?;
        if normalized.degraded {
            warn!("reviewer response was missing required fields");
        }
        Ok(normalized.verdict)
    }
}
