//! Upward manifest search bounded by the user's home directory

use crate::domain::ManifestKind;
use std::path::{Component, Path, PathBuf};

/// Walks from a script's directory towards the filesystem root looking for manifests
#[derive(Debug, Clone)]
pub struct ManifestLocator {
    /// Directory at which the walk stops; it is never consulted itself
    boundary: Option<PathBuf>,
}

impl ManifestLocator {
    /// Create a locator that stops at `boundary`
    pub fn new(boundary: Option<PathBuf>) -> Self {
        Self {
            boundary: boundary.as_deref().map(normalize_path),
        }
    }

    /// Directories searched for a script, nearest first
    pub fn search_dirs(&self, script: &Path) -> Vec<PathBuf> {
        let script = normalize_path(script);
        let mut dirs = Vec::new();
        let mut current = script.parent();

        while let Some(dir) = current {
            if self.boundary.as_deref() == Some(dir) {
                break;
            }
            dirs.push(dir.to_path_buf());
            current = dir.parent();
        }

        dirs
    }

    /// Every manifest of the given kind on the way up, nearest first
    pub fn candidates(&self, script: &Path, kind: ManifestKind) -> Vec<PathBuf> {
        self.search_dirs(script)
            .into_iter()
            .map(|dir| dir.join(kind.filename()))
            .filter(|path| path.is_file())
            .collect()
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically, without
/// touching the filesystem (symlinks are left alone)
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();

    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}
