//! Ports for the AI capabilities the engine consumes. Implementations live
//! outside this crate; tests substitute mocks.

use crate::error::AgentError;

/// Condenses one diff chunk into a short bullet-style digest.
pub trait Summarizer {
    fn summarize(
        &self,
        chunk: &str,
    ) -> impl std::future::Future<Output = Result<String, AgentError>> + Send;
}

/// Sends an assembled review prompt and returns the raw, untrusted response
/// text.
pub trait Reviewer {
    fn review(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, AgentError>> + Send;
}

/// Generates a one-line commit message for a diff. Failure is expected; the
/// caller falls back to a generic message.
pub trait CommitMessenger {
    fn commit_message(
        &self,
        diff: &str,
        task_id: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String, AgentError>> + Send;
}
