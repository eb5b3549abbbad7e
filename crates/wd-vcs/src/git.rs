use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{TimeZone, Utc};
use gix::bstr::ByteSlice;

use crate::backend::{
    CommitResult, LogEntry, VcsBackend, VcsError, VcsResult, WorkingTreeStatus,
};

/// Git backend: gix for repository discovery and history reads, git CLI for
/// staging, diffing, and committing. gix's mutation surface is still unstable,
/// and the CLI's unified-diff output is the exact format downstream consumers
/// parse, so subprocess git is deliberate here.
pub struct GitBackend {
    root: PathBuf,
}

impl GitBackend {
    pub fn open(path: &Path) -> VcsResult<Self> {
        let repo = gix::discover(path).map_err(|_| VcsError::NotARepository)?;
        let root = repo.workdir().ok_or(VcsError::NoWorkingCopy)?.to_path_buf();
        Ok(Self { root })
    }

    fn open_repo(&self) -> VcsResult<gix::Repository> {
        gix::discover(&self.root).map_err(|_| VcsError::NotARepository)
    }

    fn run_git(&self, args: &[&str]) -> VcsResult<std::process::Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| VcsError::OperationFailed {
                reason: format!("failed to run git {}: {e}", args.first().unwrap_or(&"")),
            })
    }

    fn has_head(&self) -> VcsResult<bool> {
        let output = self.run_git(&["rev-parse", "--verify", "--quiet", "HEAD"])?;
        Ok(output.status.success())
    }
}

impl VcsBackend for GitBackend {
    fn root(&self) -> &Path {
        &self.root
    }

    fn status(&self) -> VcsResult<WorkingTreeStatus> {
        // Porcelain output is locale-independent and covers staged, unstaged,
        // and untracked entries in one pass.
        let output = self.run_git(&["status", "--porcelain"])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcsError::OperationFailed {
                reason: format!("git status failed: {stderr}"),
            });
        }

        let mut status = WorkingTreeStatus::default();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            if line.len() < 4 {
                continue;
            }
            let (code, path) = line.split_at(3);
            let path = path.trim().to_string();
            if code.starts_with("??") {
                status.untracked.push(path);
            } else {
                status.changed.push(path);
            }
        }
        Ok(status)
    }

    fn stage_all(&self) -> VcsResult<()> {
        let output = self.run_git(&["add", "-A"])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcsError::OperationFailed {
                reason: format!("git add -A failed: {stderr}"),
            });
        }
        Ok(())
    }

    fn diff_uncommitted(&self) -> VcsResult<String> {
        // A repository without commits has no HEAD to diff against; the
        // staged diff against the empty tree covers that case.
        let args: &[&str] = if self.has_head()? {
            &["diff", "HEAD"]
        } else {
            &["diff", "--cached"]
        };
        let output = self.run_git(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcsError::OperationFailed {
                reason: format!("git diff failed: {stderr}"),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn commit_all(&self, message: &str) -> VcsResult<CommitResult> {
        let status = self.status()?;
        if !status.has_changes() {
            // Everything may already be staged; porcelain reports staged
            // entries too, so an empty status really means nothing to do.
            let staged = self.run_git(&["diff", "--cached", "--quiet"])?;
            if staged.status.success() {
                return Err(VcsError::NothingToCommit);
            }
        }

        self.stage_all()?;

        // --no-gpg-sign avoids GPG agent prompts in automation.
        let output = self.run_git(&["commit", "--no-gpg-sign", "-m", message])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcsError::CommitFailed {
                reason: format!("git commit failed: {stderr}"),
            });
        }

        let rev = self.run_git(&["rev-parse", "HEAD"])?;
        if !rev.status.success() {
            let stderr = String::from_utf8_lossy(&rev.stderr);
            return Err(VcsError::OperationFailed {
                reason: format!("git rev-parse HEAD failed: {stderr}"),
            });
        }
        let full_id = String::from_utf8_lossy(&rev.stdout).trim().to_string();
        let id = full_id[..12.min(full_id.len())].to_string();

        Ok(CommitResult {
            id,
            message: message.to_string(),
        })
    }

    fn log(&self, limit: usize) -> VcsResult<Vec<LogEntry>> {
        let repo = self.open_repo()?;

        // No commits yet is a normal state for this engine, not an error.
        let Ok(head_commit) = repo.head_commit() else {
            return Ok(Vec::new());
        };

        let commits = repo
            .rev_walk([head_commit.id])
            .all()
            .map_err(|e| VcsError::OperationFailed {
                reason: format!("rev walk: {e}"),
            })?;

        let mut entries = Vec::new();
        for commit_result in commits.take(limit) {
            let commit_info = commit_result.map_err(|e| VcsError::OperationFailed {
                reason: format!("walk commit: {e}"),
            })?;
            let commit_obj = commit_info.object().map_err(|e| VcsError::OperationFailed {
                reason: format!("load commit: {e}"),
            })?;
            let decoded = commit_obj.decode().map_err(|e| VcsError::OperationFailed {
                reason: format!("decode commit: {e}"),
            })?;

            let id = commit_obj.id.to_string()[..12].to_string();
            let summary = decoded
                .message
                .to_str_lossy()
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .to_string();
            let timestamp = decoded
                .author()
                .ok()
                .and_then(|author| author.time().ok())
                .and_then(|t| Utc.timestamp_opt(t.seconds, 0).single())
                .unwrap_or_else(Utc::now);

            entries.push(LogEntry {
                id,
                summary,
                timestamp,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::GitTestRepo;

    #[test]
    fn open_fails_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let result = GitBackend::open(dir.path());
        assert!(matches!(result, Err(VcsError::NotARepository)));
    }

    #[test]
    fn status_clean_after_commit() {
        let repo = GitTestRepo::new().unwrap();
        repo.write_file("a.txt", "hello").unwrap();
        repo.commit("initial").unwrap();

        let backend = GitBackend::open(repo.path()).unwrap();
        let status = backend.status().unwrap();
        assert!(!status.has_changes());
    }

    #[test]
    fn status_reports_untracked_and_modified() {
        let repo = GitTestRepo::new().unwrap();
        repo.write_file("tracked.txt", "v1").unwrap();
        repo.commit("initial").unwrap();

        repo.write_file("tracked.txt", "v2").unwrap();
        repo.write_file("new.txt", "fresh").unwrap();

        let backend = GitBackend::open(repo.path()).unwrap();
        let status = backend.status().unwrap();
        assert_eq!(status.changed, vec!["tracked.txt".to_string()]);
        assert_eq!(status.untracked, vec!["new.txt".to_string()]);
    }

    #[test]
    fn diff_includes_untracked_files_after_staging() {
        let repo = GitTestRepo::new().unwrap();
        repo.write_file("base.txt", "base").unwrap();
        repo.commit("initial").unwrap();

        repo.write_file("src/lib.rs", "pub fn f() {}\n").unwrap();

        let backend = GitBackend::open(repo.path()).unwrap();
        backend.stage_all().unwrap();
        let diff = backend.diff_uncommitted().unwrap();
        assert!(diff.contains("diff --git a/src/lib.rs b/src/lib.rs"));
        assert!(diff.contains("+pub fn f() {}"));
    }

    #[test]
    fn diff_works_before_first_commit() {
        let repo = GitTestRepo::new().unwrap();
        repo.write_file("first.txt", "content\n").unwrap();

        let backend = GitBackend::open(repo.path()).unwrap();
        backend.stage_all().unwrap();
        let diff = backend.diff_uncommitted().unwrap();
        assert!(diff.contains("first.txt"));
    }

    #[test]
    fn commit_all_records_message_and_advances_head() {
        let repo = GitTestRepo::new().unwrap();
        repo.write_file("a.txt", "a").unwrap();
        repo.commit("initial").unwrap();

        repo.write_file("b.txt", "b").unwrap();
        let backend = GitBackend::open(repo.path()).unwrap();
        let result = backend.commit_all("add b").unwrap();
        assert_eq!(result.message, "add b");
        assert_eq!(result.id.len(), 12);

        let status = backend.status().unwrap();
        assert!(!status.has_changes());
    }

    #[test]
    fn commit_all_with_clean_tree_is_nothing_to_commit() {
        let repo = GitTestRepo::new().unwrap();
        repo.write_file("a.txt", "a").unwrap();
        repo.commit("initial").unwrap();

        let backend = GitBackend::open(repo.path()).unwrap();
        let result = backend.commit_all("noop");
        assert!(matches!(result, Err(VcsError::NothingToCommit)));
    }

    #[test]
    fn log_returns_newest_first_with_limit() {
        let repo = GitTestRepo::new().unwrap();
        for i in 0..4 {
            repo.write_file(&format!("f{i}.txt"), &format!("{i}")).unwrap();
            repo.commit(&format!("commit {i}")).unwrap();
        }

        let backend = GitBackend::open(repo.path()).unwrap();
        let log = backend.log(2).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].summary, "commit 3");
        assert_eq!(log[1].summary, "commit 2");
    }

    #[test]
    fn log_of_empty_repository_is_empty() {
        let repo = GitTestRepo::new().unwrap();
        let backend = GitBackend::open(repo.path()).unwrap();
        let log = backend.log(10).unwrap();
        assert!(log.is_empty());
    }
}
