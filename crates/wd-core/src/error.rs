use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent call timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("failed to launch agent: {reason}")]
    Launch { reason: String },
    #[error("agent call failed: {reason}")]
    Failed { reason: String },
    #[error("agent returned empty output")]
    Empty,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("diff of {len} characters exceeds the {limit} character request ceiling")]
    DiffTooLarge { len: usize, limit: usize },
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to read task directory {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to read transcript {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum WardenError {
    #[error(transparent)]
    Vcs(#[from] wd_vcs::VcsError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
    #[error("internal error: {message}")]
    Internal { message: String },
}
