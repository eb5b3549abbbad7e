//! Active-task lookup. Tasks are markdown files under `.tasks/` with simple
//! `key: value` header lines; this engine only ever reads them.

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::TaskError;

#[derive(Debug, Clone)]
pub struct ActiveTask {
    pub content: String,
    pub id: Option<String>,
    pub path: PathBuf,
}

pub trait TaskSource {
    /// The currently active task for the working directory, if any.
    fn active_task(&self, workdir: &Path) -> Result<Option<ActiveTask>, TaskError>;
}

/// Scans `<workdir>/.tasks/*.md`. A task is active when its headers contain
/// `status: active` or `status: in-progress`; the first active file in name
/// order wins.
pub struct FileTaskSource;

const TASKS_DIR: &str = ".tasks";

impl TaskSource for FileTaskSource {
    fn active_task(&self, workdir: &Path) -> Result<Option<ActiveTask>, TaskError> {
        let dir = workdir.join(TASKS_DIR);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(TaskError::ReadDir {
                    path: dir.display().to_string(),
                    source: err,
                });
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        paths.sort();

        for path in paths {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable task file");
                    continue;
                }
            };
            if !is_active(&content) {
                continue;
            }
            let id = header_value(&content, "id")
                .map(ToString::to_string)
                .or_else(|| leading_digits(&path));
            return Ok(Some(ActiveTask { content, id, path }));
        }
        Ok(None)
    }
}

fn is_active(content: &str) -> bool {
    matches!(
        header_value(content, "status"),
        Some("active" | "in-progress")
    )
}

/// Reads `key: value` lines from the top of the file, stopping at the first
/// blank line.
fn header_value<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((candidate, value)) = line.split_once(':')
            && candidate.trim().eq_ignore_ascii_case(key)
        {
            return Some(value.trim());
        }
    }
    None
}

fn leading_digits(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let digits: String = name.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() { None } else { Some(digits) }
}
