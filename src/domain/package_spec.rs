//! Package specifications and bare-name matching

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

// PEP 508 distribution name followed by whatever specifier remains
static SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(.*)$").unwrap()
});
static EXACT_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.+!_-]*$").unwrap());
static SEPARATOR_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Version qualifier attached to a package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VersionReq {
    /// No qualifier, any version satisfies
    Any,
    /// Exact pin (`name==version`)
    Pinned(String),
    /// Any other specifier, kept verbatim (`>=2.0,<3`, `[extra]`, `@ url`, markers)
    Constraint(String),
}

/// A package identity as handed to the installer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Distribution name as written
    pub name: String,
    /// Version qualifier
    pub requirement: VersionReq,
}

impl PackageSpec {
    /// Creates a bare (unversioned) spec
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirement: VersionReq::Any,
        }
    }

    /// Creates a spec pinned to an exact version
    pub fn pinned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirement: VersionReq::Pinned(version.into()),
        }
    }

    /// Creates a spec carrying a verbatim specifier
    pub fn constrained(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirement: VersionReq::Constraint(constraint.into()),
        }
    }

    /// Parses a single requirement line such as `numpy`, `numpy==1.26.0`
    /// or `requests[socks]>=2.28`.
    ///
    /// Returns `None` when the line does not start with a valid distribution name.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = SPEC_RE.captures(line.trim())?;
        let name = caps.get(1)?.as_str();
        let rest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

        if rest.is_empty() {
            return Some(Self::bare(name));
        }

        if let Some(version) = rest.strip_prefix("==") {
            let version = version.trim();
            if EXACT_VERSION_RE.is_match(version) {
                return Some(Self::pinned(name, version));
            }
        }

        Some(Self::constrained(name, rest))
    }

    /// Bare name used for all reconciliation comparisons
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    /// True when the spec carries any version qualifier
    pub fn is_versioned(&self) -> bool {
        !matches!(self.requirement, VersionReq::Any)
    }

    /// Exact version, if pinned
    pub fn version(&self) -> Option<&str> {
        match &self.requirement {
            VersionReq::Pinned(version) => Some(version),
            _ => None,
        }
    }

    /// Drops any version qualifier
    pub fn to_bare(&self) -> Self {
        Self::bare(self.name.clone())
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.requirement {
            VersionReq::Any => write!(f, "{}", self.name),
            VersionReq::Pinned(version) => write!(f, "{}=={}", self.name, version),
            VersionReq::Constraint(c) if c.starts_with('@') || c.starts_with(';') => {
                write!(f, "{} {}", self.name, c)
            }
            VersionReq::Constraint(c) => write!(f, "{}{}", self.name, c),
        }
    }
}

/// PEP 503 name normalization: lowercase, runs of `-`, `_`, `.` collapse to `-`
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUN_RE
        .replace_all(&name.trim().to_lowercase(), "-")
        .into_owned()
}
