use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("not a git repository")]
    NotARepository,
    #[error("bare repository has no working copy")]
    NoWorkingCopy,
    #[error("nothing to commit")]
    NothingToCommit,
    #[error("commit failed: {reason}")]
    CommitFailed { reason: String },
    #[error("operation failed: {reason}")]
    OperationFailed { reason: String },
}

pub type VcsResult<T> = Result<T, VcsError>;

/// Tracked-but-dirty and untracked paths in the working tree.
#[derive(Debug, Clone, Default)]
pub struct WorkingTreeStatus {
    pub changed: Vec<String>,
    pub untracked: Vec<String>,
}

impl WorkingTreeStatus {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty() || !self.untracked.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CommitResult {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

/// The version-control operations the review engine depends on.
///
/// Mutating operations (`stage_all`, `commit_all`) are assumed single-writer;
/// the engine never coordinates with concurrent writers on the same tree.
pub trait VcsBackend {
    fn root(&self) -> &Path;

    /// Dirty and untracked paths, newest state of the working tree.
    fn status(&self) -> VcsResult<WorkingTreeStatus>;

    /// Stage every change, including untracked files, so new files are
    /// visible to `diff_uncommitted`.
    fn stage_all(&self) -> VcsResult<()>;

    /// Unified diff of all uncommitted changes against HEAD.
    fn diff_uncommitted(&self) -> VcsResult<String>;

    /// Stage everything and commit with the given message.
    fn commit_all(&self, message: &str) -> VcsResult<CommitResult>;

    /// Most recent commits, newest first.
    fn log(&self, limit: usize) -> VcsResult<Vec<LogEntry>>;
}
