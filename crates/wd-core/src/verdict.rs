//! Defensive extraction of a structured verdict from untrusted reviewer
//! output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    OnTrack,
    Deviation,
    NeedsVerification,
    CriticalFailure,
    ReviewFailed,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::OnTrack => "on_track",
            Self::Deviation => "deviation",
            Self::NeedsVerification => "needs_verification",
            Self::CriticalFailure => "critical_failure",
            Self::ReviewFailed => "review_failed",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewVerdict {
    pub status: ReviewStatus,
    pub message: String,
    #[serde(rename = "commitMessage", default)]
    pub commit_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A verdict plus whether required fields had to be defaulted. Degraded
/// verdicts are still acted on; the caller only logs the degradation.
#[derive(Debug, Clone)]
pub struct NormalizedVerdict {
    pub verdict: ReviewVerdict,
    pub degraded: bool,
}

/// Extract a verdict from raw reviewer text. Tolerates markdown fencing,
/// leading and trailing prose, and one level of the legacy
/// `{"type": "result", "result": "..."}` envelope that the CLI's JSON output
/// mode wraps responses in. Returns `None` only when no JSON object can be
/// found at all.
pub fn normalize_response(raw: &str) -> Option<NormalizedVerdict> {
    let text = strip_fences(raw);
    let value = parse_lenient(text)?;

    let value = match unwrap_legacy_envelope(&value) {
        Some(inner_text) => parse_lenient(strip_fences(inner_text))?,
        None => value,
    };

    verdict_from_value(&value)
}

fn unwrap_legacy_envelope(value: &Value) -> Option<&str> {
    if value.get("type").and_then(Value::as_str) == Some("result") {
        value.get("result").and_then(Value::as_str)
    } else {
        None
    }
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the fence line (which may carry a language tag) and the closing
    // fence.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_lenient(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text)
        && value.is_object()
    {
        return Some(value);
    }
    let candidate = first_json_object(text)?;
    serde_json::from_str::<Value>(candidate).ok()
}

/// Find the first balanced brace-delimited span, skipping braces inside JSON
/// string literals.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn verdict_from_value(value: &Value) -> Option<NormalizedVerdict> {
    let object = value.as_object()?;
    let mut degraded = false;

    let status = match object.get("status").and_then(Value::as_str) {
        Some(raw_status) => {
            match serde_json::from_value::<ReviewStatus>(Value::String(raw_status.to_string())) {
                Ok(status) => status,
                Err(_) => {
                    degraded = true;
                    ReviewStatus::ReviewFailed
                }
            }
        }
        None => {
            degraded = true;
            ReviewStatus::ReviewFailed
        }
    };

    let message = match object.get("message").and_then(Value::as_str) {
        Some(message) => message.to_string(),
        None => {
            degraded = true;
            String::new()
        }
    };

    let commit_message = object
        .get("commitMessage")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let details = object
        .get("details")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    Some(NormalizedVerdict {
        verdict: ReviewVerdict {
            status,
            message,
            commit_message,
            details,
        },
        degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_clean_verdict_object() {
        let raw = r#"{"status": "on_track", "message": "looks good", "commitMessage": "feat: add parser", "details": null}"#;
        let normalized = normalize_response(raw).unwrap();
        assert!(!normalized.degraded);
        assert_eq!(normalized.verdict.status, ReviewStatus::OnTrack);
        assert_eq!(normalized.verdict.commit_message, "feat: add parser");
    }

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n{\"status\": \"deviation\", \"message\": \"off course\", \"commitMessage\": \"\"}\n```";
        let normalized = normalize_response(raw).unwrap();
        assert!(!normalized.degraded);
        assert_eq!(normalized.verdict.status, ReviewStatus::Deviation);
        assert!(normalized.verdict.commit_message.is_empty());
    }

    #[test]
    fn tolerates_surrounding_prose() {
        let raw = r#"Sure! Here is my assessment:
{"status": "needs_verification", "message": "no tests were run", "commitMessage": ""}
Let me know if you need anything else."#;
        let normalized = normalize_response(raw).unwrap();
        assert_eq!(normalized.verdict.status, ReviewStatus::NeedsVerification);
    }

    #[test]
    fn unwraps_the_legacy_envelope_with_inner_prose() {
        let inner = r#"Here is the verdict: {"status": "on_track", "message": "solid work", "commitMessage": "fix: handle empty input"}"#;
        let raw = serde_json::json!({"type": "result", "result": inner}).to_string();
        let normalized = normalize_response(&raw).unwrap();
        assert!(!normalized.degraded);
        assert_eq!(normalized.verdict.status, ReviewStatus::OnTrack);
        assert_eq!(normalized.verdict.commit_message, "fix: handle empty input");
    }

    #[test]
    fn missing_status_degrades_to_review_failed() {
        let raw = r#"{"message": "no idea", "commitMessage": ""}"#;
        let normalized = normalize_response(raw).unwrap();
        assert!(normalized.degraded);
        assert_eq!(normalized.verdict.status, ReviewStatus::ReviewFailed);
        assert_eq!(normalized.verdict.message, "no idea");
    }

    #[test]
    fn unknown_status_degrades_to_review_failed() {
        let raw = r#"{"status": "meh", "message": "shrug", "commitMessage": ""}"#;
        let normalized = normalize_response(raw).unwrap();
        assert!(normalized.degraded);
        assert_eq!(normalized.verdict.status, ReviewStatus::ReviewFailed);
    }

    #[test]
    fn braces_inside_string_literals_do_not_break_the_scan() {
        let raw = r#"noise {"status": "on_track", "message": "kept `{}` literal", "commitMessage": "ok"} tail"#;
        let normalized = normalize_response(raw).unwrap();
        assert_eq!(normalized.verdict.status, ReviewStatus::OnTrack);
        assert_eq!(normalized.verdict.message, "kept `{}` literal");
    }

    #[test]
    fn pure_prose_yields_nothing() {
        assert!(normalize_response("I refuse to answer in JSON.").is_none());
        assert!(normalize_response("").is_none());
    }
}
