//! Configuration, loaded from `.warden/config.toml` with environment
//! overrides.

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Binary used for summarization, review, and commit-message generation.
    pub claude_bin: String,
    pub review_timeout_secs: u64,
    pub summary_timeout_secs: u64,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            claude_bin: "claude".to_string(),
            review_timeout_secs: 120,
            summary_timeout_secs: 60,
        }
    }
}

impl WardenConfig {
    /// Defaults, then `.warden/config.toml` if present, then `WARDEN_*`
    /// environment variables. A malformed file is logged and ignored.
    pub fn load(workdir: &Path) -> Self {
        let mut config = Self::from_file(workdir).unwrap_or_default();

        if let Ok(bin) = std::env::var("WARDEN_CLAUDE_BIN")
            && !bin.is_empty()
        {
            config.claude_bin = bin;
        }
        if let Ok(secs) = std::env::var("WARDEN_REVIEW_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse()
        {
            config.review_timeout_secs = secs;
        }
        if let Ok(secs) = std::env::var("WARDEN_SUMMARY_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse()
        {
            config.summary_timeout_secs = secs;
        }
        config
    }

    fn from_file(workdir: &Path) -> Option<Self> {
        let path = workdir.join(".warden").join("config.toml");
        let raw = std::fs::read_to_string(&path).ok()?;
        match toml::from_str(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring malformed config");
                None
            }
        }
    }
}
