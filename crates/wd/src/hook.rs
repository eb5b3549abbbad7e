//! Stop-hook I/O and the manual review command.
//!
//! The hook contract: the assistant pipes a JSON payload to stdin and reads
//! a JSON decision from stdout. `{"decision": "block", "reason": ...}`
//! forces the session to continue; anything else allows it to stop. The
//! hook must always answer, so every failure path degrades to an allow.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use owo_colors::OwoColorize;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use wd_agent::ClaudeCli;
use wd_core::{CycleInput, CycleOutcome, FileTaskSource, ReviewEngine, WardenConfig};
use wd_vcs::{GitBackend, VcsError};

/// Cap on the stdin payload; a well-formed hook payload is tiny.
const MAX_HOOK_INPUT: u64 = 1024 * 1024;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HookInput {
    session_id: String,
    transcript_path: Option<PathBuf>,
    cwd: Option<PathBuf>,
    stop_hook_active: bool,
}

fn read_hook_input() -> HookInput {
    let mut raw = String::new();
    if let Err(err) = std::io::stdin().take(MAX_HOOK_INPUT).read_to_string(&mut raw) {
        warn!(error = %err, "could not read hook payload");
        return HookInput::default();
    }
    match serde_json::from_str(&raw) {
        Ok(input) => input,
        Err(err) => {
            warn!(error = %err, "malformed hook payload");
            HookInput::default()
        }
    }
}

fn working_dir(input: &HookInput) -> PathBuf {
    input
        .cwd
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn status_note(line: &str) {
    eprintln!("{} {}", "[warden]".cyan().bold(), line);
}

async fn run_cycle(workdir: &Path, input: &HookInput) -> CycleOutcome {
    let backend = match GitBackend::open(workdir) {
        Ok(backend) => backend,
        Err(VcsError::NotARepository) => {
            return CycleOutcome::informational("not a git repository; nothing to review");
        }
        Err(err) => {
            warn!(error = %err, "could not open repository");
            return CycleOutcome::informational("repository unavailable; nothing to review");
        }
    };

    let config = WardenConfig::load(workdir);
    let agent = ClaudeCli::from_config(&config, workdir);
    let engine = ReviewEngine::new(
        Box::new(backend),
        Box::new(FileTaskSource),
        agent.clone(),
        agent.clone(),
        agent,
        config,
    );

    engine
        .run(&CycleInput {
            workdir: workdir.to_path_buf(),
            transcript_path: input.transcript_path.clone(),
            stop_hook_active: input.stop_hook_active,
        })
        .await
}

pub async fn run_stop_hook() -> ExitCode {
    let input = read_hook_input();
    let workdir = working_dir(&input);
    if !input.session_id.is_empty() {
        tracing::debug!(session = %input.session_id, "stop hook invoked");
    }

    let outcome = run_cycle(&workdir, &input).await;

    status_note(&outcome.control.status_line);
    if let Some(suggestion) = &outcome.suggestion {
        eprintln!("{} {}", "[warden]".yellow().bold(), suggestion);
    }

    let payload = match &outcome.control.block_reason {
        Some(reason) => json!({
            "decision": "block",
            "reason": reason,
        }),
        None => json!({
            "hookSpecificOutput": {
                "hookEventName": "Stop",
                "additionalContext": outcome.control.status_line,
            },
        }),
    };
    println!("{payload}");
    ExitCode::SUCCESS
}

pub async fn run_manual_review() -> ExitCode {
    let input = HookInput::default();
    let workdir = working_dir(&input);

    let outcome = run_cycle(&workdir, &input).await;

    status_note(&outcome.control.status_line);
    if let Some(verdict) = &outcome.verdict {
        println!("status:    {}", verdict.status);
        println!("message:   {}", verdict.message);
        if !verdict.commit_message.is_empty() {
            println!("commit:    {}", verdict.commit_message);
        }
        if let Some(details) = &verdict.details {
            println!("details:   {details}");
        }
        println!("committed: {}", outcome.committed);
    } else {
        println!("{}", outcome.control.status_line);
    }
    if let Some(suggestion) = &outcome.suggestion {
        println!("note:      {suggestion}");
    }

    if outcome.control.allow_stop {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
