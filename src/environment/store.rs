//! On-disk store of per-project environments
//!
//! Each working directory maps to one environment directory under the store
//! root, named `venv_` followed by the first 8 hex digits of the SHA-256 of
//! the directory path. Old environments are evicted least-recently-used first.

use super::metadata::EnvironmentMetadata;
use super::PythonToolchain;
use crate::error::EnvironmentError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory name of the store under the user's home
pub const DEFAULT_STORE_DIR: &str = ".nowpy";

/// Default number of environments kept on disk
pub const DEFAULT_RETENTION: usize = 5;

const ENV_PREFIX: &str = "venv_";

/// Stable identity of a project's environment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvironmentId(String);

impl EnvironmentId {
    /// Identity derived from the project (working) directory path
    pub fn for_project(project: &Path) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(project.to_string_lossy().as_bytes());
        let digest = hex::encode(hasher.finalize());
        Self(format!("{}{}", ENV_PREFIX, &digest[..8]))
    }

    /// Identity of an existing store directory, if its name looks like one
    pub fn from_dir_name(name: &str) -> Option<Self> {
        name.starts_with(ENV_PREFIX).then(|| Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An environment found in the store
#[derive(Debug, Clone)]
pub struct StoredEnvironment {
    pub id: EnvironmentId,
    pub path: PathBuf,
    /// From the metadata file, or the directory mtime when there is none
    pub last_used: DateTime<Utc>,
}

/// Outcome of a pruning pass
#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    /// Environments deleted
    pub removed: Vec<EnvironmentId>,
    /// Environments that could not be deleted, with the reason
    pub failed: Vec<(EnvironmentId, String)>,
}

/// Repository of isolated environments rooted at one directory
#[derive(Debug, Clone)]
pub struct EnvironmentStore {
    root: PathBuf,
}

impl EnvironmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Environment identity for a project directory
    pub fn locate(&self, project: &Path) -> EnvironmentId {
        EnvironmentId::for_project(project)
    }

    pub fn path(&self, id: &EnvironmentId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn exists(&self, id: &EnvironmentId) -> bool {
        self.path(id).is_dir()
    }

    /// Create the environment unless it already exists.
    ///
    /// Returns `true` when a new environment was created.
    pub fn create<T: PythonToolchain + ?Sized>(
        &self,
        id: &EnvironmentId,
        project: &Path,
        toolchain: &T,
    ) -> Result<bool, EnvironmentError> {
        if self.exists(id) {
            return Ok(false);
        }

        std::fs::create_dir_all(&self.root).map_err(|e| EnvironmentError::io(&self.root, e))?;

        let path = self.path(id);
        if let Err(e) = toolchain.create_environment(&path) {
            if path.exists() {
                if let Err(rm) = std::fs::remove_dir_all(&path) {
                    warn!("could not remove half-created {}: {}", path.display(), rm);
                }
            }
            return Err(e);
        }

        if let Err(e) = EnvironmentMetadata::new(project).save(&path) {
            warn!("could not write metadata for {}: {}", id, e);
        }
        debug!(environment = %id, path = %path.display(), "environment created");
        Ok(true)
    }

    /// Record that the environment is being used now
    pub fn touch(&self, id: &EnvironmentId, project: &Path) -> Result<(), EnvironmentError> {
        let path = self.path(id);
        let metadata = match EnvironmentMetadata::load(&path) {
            Some(existing) => existing.used_at(Utc::now()),
            None => EnvironmentMetadata::new(project),
        };
        metadata
            .save(&path)
            .map_err(|e| EnvironmentError::io(&path, e))
    }

    /// All environments in the store; a missing root means an empty store
    pub fn list(&self) -> Result<Vec<StoredEnvironment>, EnvironmentError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let entries =
            std::fs::read_dir(&self.root).map_err(|e| EnvironmentError::io(&self.root, e))?;

        let mut environments = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(EnvironmentId::from_dir_name)
            else {
                continue;
            };

            let last_used = EnvironmentMetadata::load(&path)
                .map(|m| m.last_used)
                .or_else(|| {
                    entry
                        .metadata()
                        .and_then(|m| m.modified())
                        .ok()
                        .map(DateTime::<Utc>::from)
                })
                .unwrap_or_else(|| DateTime::<Utc>::from(std::time::UNIX_EPOCH));

            environments.push(StoredEnvironment {
                id,
                path,
                last_used,
            });
        }

        Ok(environments)
    }

    /// Delete least-recently-used environments until at most `retention`
    /// remain. `protected` is never deleted. Failures are logged and
    /// reported, never raised.
    pub fn prune(&self, retention: usize, protected: &EnvironmentId) -> PruneReport {
        let mut report = PruneReport::default();

        let mut environments = match self.list() {
            Ok(environments) => environments,
            Err(e) => {
                warn!("cannot clean up environments: {}", e);
                return report;
            }
        };

        let excess = environments.len().saturating_sub(retention);
        if excess == 0 {
            return report;
        }

        environments.sort_by(|a, b| {
            a.last_used
                .cmp(&b.last_used)
                .then_with(|| a.id.cmp(&b.id))
        });

        for env in environments
            .iter()
            .filter(|env| &env.id != protected)
            .take(excess)
        {
            match std::fs::remove_dir_all(&env.path) {
                Ok(()) => {
                    debug!(environment = %env.id, "pruned environment");
                    report.removed.push(env.id.clone());
                }
                Err(e) => {
                    warn!("cannot clean up environment {}: {}", env.id, e);
                    report.failed.push((env.id.clone(), e.to_string()));
                }
            }
        }

        report
    }
}
