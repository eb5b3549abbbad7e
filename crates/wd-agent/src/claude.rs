//! Shells out to the `claude` CLI for summaries, reviews, and commit
//! messages. The prompt goes in on stdin; `-p` prints the response to
//! stdout and exits.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use wd_core::commit::decorate_with_task;
use wd_core::{AgentError, CommitMessenger, Reviewer, Summarizer, WardenConfig};

#[derive(Clone)]
pub struct ClaudeCli {
    bin: String,
    workdir: PathBuf,
    review_timeout: Duration,
    summary_timeout: Duration,
}

impl ClaudeCli {
    pub fn new(
        bin: impl Into<String>,
        workdir: impl Into<PathBuf>,
        review_timeout: Duration,
        summary_timeout: Duration,
    ) -> Self {
        Self {
            bin: bin.into(),
            workdir: workdir.into(),
            review_timeout,
            summary_timeout,
        }
    }

    pub fn from_config(config: &WardenConfig, workdir: &Path) -> Self {
        Self::new(
            config.claude_bin.clone(),
            workdir,
            Duration::from_secs(config.review_timeout_secs),
            Duration::from_secs(config.summary_timeout_secs),
        )
    }

    async fn run_prompt(&self, prompt: &str, timeout: Duration) -> Result<String, AgentError> {
        debug!(bin = %self.bin, chars = prompt.len(), "invoking agent");

        let mut child = Command::new(&self.bin)
            .arg("-p")
            .current_dir(&self.workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| AgentError::Launch {
                reason: err.to_string(),
            })?;

        let mut stdin = child.stdin.take().ok_or(AgentError::Launch {
            reason: "stdin unavailable".to_string(),
        })?;
        stdin
            .write_all(prompt.as_bytes())
            .await
            .map_err(|err| AgentError::Failed {
                reason: format!("writing prompt: {err}"),
            })?;
        drop(stdin);

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| AgentError::Timeout {
                secs: timeout.as_secs(),
            })?
            .map_err(|err| AgentError::Failed {
                reason: err.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AgentError::Failed {
                reason: format!("agent exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(AgentError::Empty);
        }
        Ok(text)
    }
}

impl Summarizer for ClaudeCli {
    async fn summarize(&self, chunk: &str) -> Result<String, AgentError> {
        let prompt = format!(
            "Summarize this diff chunk as 3-6 terse bullet points covering what changed and why it might matter. Respond with only the bullets.\n\n{chunk}"
        );
        self.run_prompt(&prompt, self.summary_timeout).await
    }
}

impl Reviewer for ClaudeCli {
    async fn review(&self, prompt: &str) -> Result<String, AgentError> {
        self.run_prompt(prompt, self.review_timeout).await
    }
}

impl CommitMessenger for ClaudeCli {
    async fn commit_message(&self, diff: &str, task_id: Option<&str>) -> Result<String, AgentError> {
        let prompt = format!(
            "Write a single-line conventional commit message for this diff. Respond with only the message, no quotes.\n\n{diff}"
        );
        let message = self.run_prompt(&prompt, self.summary_timeout).await?;
        let first_line = message.lines().next().unwrap_or("").trim().to_string();
        if first_line.is_empty() {
            return Err(AgentError::Empty);
        }
        Ok(decorate_with_task(&first_line, task_id))
    }
}
