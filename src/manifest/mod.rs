//! Manifest discovery and parsing
//!
//! This module provides functionality to:
//! - Locate the nearest manifest of each kind above a script
//! - Parse requirements.txt and pyproject.toml into package specs
//! - Apply the precedence rule: requirements.txt first, pyproject.toml as fallback

mod locator;
mod pyproject_toml;
mod requirements_txt;

pub use locator::ManifestLocator;
pub use pyproject_toml::{pin_from_constraint, PyprojectTomlParser};
pub use requirements_txt::RequirementsTxtParser;

use crate::domain::{ManifestKind, PackageSpec};
use crate::error::ManifestError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Trait for parsing manifest files
pub trait ManifestParser {
    /// Parse package specs from manifest content
    fn parse(&self, content: &str) -> Result<Vec<PackageSpec>, ManifestError>;

    /// Returns the manifest kind this parser handles
    fn kind(&self) -> ManifestKind;
}

/// Packages declared by a single manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Format of the manifest
    pub kind: ManifestKind,
    /// Declared packages, in file order
    pub packages: Vec<PackageSpec>,
}

/// Get a manifest parser for the specified kind
pub fn get_parser(kind: ManifestKind) -> Box<dyn ManifestParser> {
    match kind {
        ManifestKind::Requirements => Box::new(RequirementsTxtParser),
        ManifestKind::Pyproject => Box::new(PyprojectTomlParser),
    }
}

/// Read and parse one manifest file
pub fn load_manifest(path: &Path, kind: ManifestKind) -> Result<Manifest, ManifestError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))?;

    let packages = get_parser(kind).parse(&content).map_err(|e| match e {
        ManifestError::TomlParseError { message, .. } => {
            ManifestError::toml_parse_error(path, message)
        }
        other => other,
    })?;

    Ok(Manifest {
        path: path.to_path_buf(),
        kind,
        packages,
    })
}

/// Nearest usable manifest of one kind above `script`.
///
/// A manifest that cannot be read or parsed counts as absent at its level and
/// the search continues upward.
pub fn find_manifest(
    locator: &ManifestLocator,
    script: &Path,
    kind: ManifestKind,
) -> Option<Manifest> {
    for candidate in locator.candidates(script, kind) {
        match load_manifest(&candidate, kind) {
            Ok(manifest) => {
                debug!(
                    path = %manifest.path.display(),
                    packages = manifest.packages.len(),
                    "using manifest"
                );
                return Some(manifest);
            }
            Err(e) => warn!("ignoring {}: {}", candidate.display(), e),
        }
    }
    None
}

/// Declared packages for a script: the nearest requirements.txt if there is
/// one, otherwise the nearest pyproject.toml. The two are never merged.
pub fn find_declared(locator: &ManifestLocator, script: &Path) -> Option<Manifest> {
    ManifestKind::all()
        .iter()
        .find_map(|kind| find_manifest(locator, script, *kind))
}
