//! Per-environment bookkeeping file used for least-recently-used pruning

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File written inside every environment directory
pub const METADATA_FILE: &str = ".nowpy-env.json";

/// Who owns an environment and when it was last used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentMetadata {
    /// Working directory the environment was created for
    pub project: PathBuf,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl EnvironmentMetadata {
    /// Fresh metadata stamped with the current time
    pub fn new(project: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            project: project.into(),
            created_at: now,
            last_used: now,
        }
    }

    /// Copy with `last_used` set to `at`
    pub fn used_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_used = at;
        self
    }

    /// Read the metadata of an environment; missing or unreadable files yield `None`
    pub fn load(env_dir: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(env_dir.join(METADATA_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save(&self, env_dir: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(env_dir.join(METADATA_FILE), json)
    }
}
