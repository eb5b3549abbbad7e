pub mod backend;
pub mod git;

#[cfg(test)]
pub mod testutil;

pub use crate::backend::{
    CommitResult, LogEntry, VcsBackend, VcsError, VcsResult, WorkingTreeStatus,
};
pub use crate::git::GitBackend;
