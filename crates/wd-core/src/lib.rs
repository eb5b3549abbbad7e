//! Session review and auto-commit decision engine.
//!
//! One review cycle runs per session-stop event: inspect the uncommitted
//! change set, separate code from documentation noise, compress oversized
//! diffs, ask an AI reviewer whether the work matches the active task, map
//! the verdict to a session-control action, and commit so progress is never
//! silently lost.

pub mod agent;
pub mod commit;
pub mod compress;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod limits;
pub mod policy;
pub mod request;
pub mod tasks;
pub mod transcript;
pub mod verdict;

pub use crate::agent::{CommitMessenger, Reviewer, Summarizer};
pub use crate::config::WardenConfig;
pub use crate::engine::{CycleInput, CycleOutcome, ReviewEngine};
pub use crate::error::{AgentError, RequestError, TaskError, TranscriptError, WardenError};
pub use crate::policy::SessionControl;
pub use crate::tasks::{ActiveTask, FileTaskSource, TaskSource};
pub use crate::verdict::{ReviewStatus, ReviewVerdict};
