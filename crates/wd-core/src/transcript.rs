//! Renders a bounded, chronological window of the conversation transcript.
//!
//! Transcripts are JSONL, one message per line, with content either a plain
//! string or a list of typed blocks (only `text` blocks matter here).

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::error::TranscriptError;

#[derive(Debug, Clone, Default)]
pub struct TranscriptWindow {
    pub text: String,
    pub message_count: usize,
}

#[derive(Deserialize)]
struct TranscriptLine {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    message: Option<TranscriptMessage>,
}

#[derive(Deserialize)]
struct TranscriptMessage {
    role: String,
    content: MessageContent,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Chronological `User:`/`Assistant:` rendering of messages newer than
/// `since`, keeping the most recent messages that fit in `max_chars`.
/// A missing transcript yields an empty window; malformed lines are skipped.
pub fn recent_context(
    path: &Path,
    since: Option<DateTime<Utc>>,
    max_chars: usize,
) -> Result<TranscriptWindow, TranscriptError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "transcript not found");
            return Ok(TranscriptWindow::default());
        }
        Err(err) => {
            return Err(TranscriptError::Read {
                path: path.display().to_string(),
                source: err,
            });
        }
    };

    let mut entries: Vec<String> = Vec::new();
    for line in raw.lines() {
        let Ok(parsed) = serde_json::from_str::<TranscriptLine>(line) else {
            continue;
        };
        let Some(message) = parsed.message else {
            continue;
        };
        if let (Some(cutoff), Some(stamp)) = (since, parsed.timestamp.as_deref())
            && let Ok(at) = DateTime::parse_from_rfc3339(stamp)
            && at.with_timezone(&Utc) < cutoff
        {
            continue;
        }

        let label = match message.role.as_str() {
            "user" => "User",
            "assistant" => "Assistant",
            _ => continue,
        };
        let body = render_content(&message.content);
        if body.is_empty() {
            continue;
        }
        entries.push(format!("{label}: {body}"));
    }

    // Keep the newest messages that fit, then restore chronological order.
    let mut kept: Vec<&String> = Vec::new();
    let mut used = 0usize;
    for entry in entries.iter().rev() {
        let cost = entry.chars().count() + 2;
        if used + cost > max_chars && !kept.is_empty() {
            break;
        }
        used += cost;
        kept.push(entry);
    }
    kept.reverse();

    Ok(TranscriptWindow {
        message_count: kept.len(),
        text: kept
            .iter()
            .map(|entry| entry.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"),
    })
}

fn render_content(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.trim().to_string(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn write_transcript(lines: &[serde_json::Value]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        let body: String = lines.iter().map(|l| format!("{l}\n")).collect();
        std::fs::write(&path, body).unwrap();
        (dir, path)
    }

    fn user_line(ts: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "timestamp": ts,
            "message": {"role": "user", "content": text},
        })
    }

    #[test]
    fn missing_transcript_is_an_empty_window() {
        let dir = tempfile::tempdir().unwrap();
        let window = recent_context(&dir.path().join("nope.jsonl"), None, 1_000).unwrap();
        assert!(window.text.is_empty());
        assert_eq!(window.message_count, 0);
    }

    #[test]
    fn renders_chronological_labeled_messages() {
        let (_dir, path) = write_transcript(&[
            user_line("2026-08-01T10:00:00Z", "please add the parser"),
            serde_json::json!({
                "timestamp": "2026-08-01T10:01:00Z",
                "message": {"role": "assistant", "content": [
                    {"type": "text", "text": "adding it now"},
                    {"type": "tool_use", "id": "t1", "name": "edit", "input": {}},
                ]},
            }),
        ]);

        let window = recent_context(&path, None, 10_000).unwrap();
        assert_eq!(window.message_count, 2);
        assert_eq!(
            window.text,
            "User: please add the parser\n\nAssistant: adding it now"
        );
    }

    #[test]
    fn messages_before_the_cutoff_are_dropped() {
        let (_dir, path) = write_transcript(&[
            user_line("2026-08-01T09:00:00Z", "old request"),
            user_line("2026-08-01T11:00:00Z", "new request"),
        ]);

        let cutoff = Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap();
        let window = recent_context(&path, Some(cutoff), 10_000).unwrap();
        assert_eq!(window.message_count, 1);
        assert!(window.text.contains("new request"));
        assert!(!window.text.contains("old request"));
    }

    #[test]
    fn char_bound_keeps_the_most_recent_messages() {
        let (_dir, path) = write_transcript(&[
            user_line("2026-08-01T10:00:00Z", &"a".repeat(400)),
            user_line("2026-08-01T10:01:00Z", "the final word"),
        ]);

        let window = recent_context(&path, None, 100).unwrap();
        assert_eq!(window.message_count, 1);
        assert!(window.text.contains("the final word"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        std::fs::write(
            &path,
            "not json at all\n{\"message\":{\"role\":\"user\",\"content\":\"kept\"}}\n",
        )
        .unwrap();

        let window = recent_context(&path, None, 1_000).unwrap();
        assert_eq!(window.message_count, 1);
        assert_eq!(window.text, "User: kept");
    }
}
