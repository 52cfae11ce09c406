//! Manifest kinds recognized when looking for declared dependencies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported dependency manifest formats, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestKind {
    /// Plain list of specifiers (requirements.txt)
    Requirements,
    /// Structured dependency table (pyproject.toml)
    Pyproject,
}

impl ManifestKind {
    /// Returns the manifest filename for this kind
    pub fn filename(&self) -> &'static str {
        match self {
            ManifestKind::Requirements => "requirements.txt",
            ManifestKind::Pyproject => "pyproject.toml",
        }
    }

    /// Returns all kinds, the preferred one first
    pub fn all() -> &'static [ManifestKind] {
        &[ManifestKind::Requirements, ManifestKind::Pyproject]
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename())
    }
}
