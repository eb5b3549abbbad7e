use std::path::Path;
use std::process::Command;

/// Temporary git repository for exercising the backend against real git.
pub struct GitTestRepo {
    dir: tempfile::TempDir,
}

impl GitTestRepo {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        run(dir.path(), &["init", "-q", "-b", "main"])?;
        run(dir.path(), &["config", "user.email", "test@example.com"])?;
        run(dir.path(), &["config", "user.name", "Test User"])?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel: &str, content: &str) -> std::io::Result<()> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    pub fn commit(&self, message: &str) -> std::io::Result<String> {
        run(self.dir.path(), &["add", "-A"])?;
        run(self.dir.path(), &["commit", "--no-gpg-sign", "-m", message])?;
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(self.dir.path())
            .output()?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn run(dir: &Path, args: &[&str]) -> std::io::Result<()> {
    let status = Command::new("git").args(args).current_dir(dir).status()?;
    assert!(status.success(), "git {args:?} failed");
    Ok(())
}
