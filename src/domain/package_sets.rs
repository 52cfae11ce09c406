//! Set types flowing through the resolution workflow

use super::PackageSpec;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Top-level module names referenced by a script's imports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImportSet(BTreeSet<String>);

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module name; returns false if it was already present
    pub fn insert(&mut self, module: impl Into<String>) -> bool {
        self.0.insert(module.into())
    }

    pub fn contains(&self, module: &str) -> bool {
        self.0.contains(module)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ImportSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Snapshot of the packages present in an environment at query time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSet {
    packages: Vec<PackageSpec>,
}

impl InstalledSet {
    pub fn new(packages: Vec<PackageSpec>) -> Self {
        Self { packages }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn packages(&self) -> &[PackageSpec] {
        &self.packages
    }

    /// Normalized bare names of everything installed
    pub fn bare_names(&self) -> HashSet<String> {
        self.packages.iter().map(PackageSpec::key).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// The install list: unique by bare name, sorted by normalized name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingSet {
    packages: Vec<PackageSpec>,
}

impl MissingSet {
    /// Wraps specs that are already deduplicated and ordered
    pub(crate) fn from_sorted(packages: Vec<PackageSpec>) -> Self {
        Self { packages }
    }

    pub fn packages(&self) -> &[PackageSpec] {
        &self.packages
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageSpec> {
        self.packages.iter()
    }

    /// Installer arguments, one per package
    pub fn to_strings(&self) -> Vec<String> {
        self.packages.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_set_dedup() {
        let mut imports = ImportSet::new();
        assert!(imports.insert("requests"));
        assert!(!imports.insert("requests"));
        assert_eq!(imports.len(), 1);
        assert!(imports.contains("requests"));
    }

    #[test]
    fn test_import_set_from_iter_sorted() {
        let imports: ImportSet = ["numpy", "attrs", "numpy"].into_iter().collect();
        assert_eq!(imports.iter().collect::<Vec<_>>(), vec!["attrs", "numpy"]);
    }

    #[test]
    fn test_installed_bare_names() {
        let installed = InstalledSet::new(vec![
            PackageSpec::pinned("PyYAML", "6.0"),
            PackageSpec::pinned("numpy", "1.26.0"),
        ]);
        let names = installed.bare_names();
        assert!(names.contains("pyyaml"));
        assert!(names.contains("numpy"));
        assert_eq!(installed.len(), 2);
    }

    #[test]
    fn test_missing_set_strings() {
        let missing = MissingSet::from_sorted(vec![
            PackageSpec::pinned("numpy", "1.26.0"),
            PackageSpec::bare("requests"),
        ]);
        assert_eq!(missing.to_strings(), vec!["numpy==1.26.0", "requests"]);
        assert!(!missing.is_empty());
    }
}
