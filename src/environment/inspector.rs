//! Installed-package inspection via `pip freeze`

use super::{EnvironmentId, EnvironmentStore, PythonToolchain};
use crate::domain::{InstalledSet, PackageSpec};
use crate::error::EnvironmentError;
use tracing::debug;

/// Parse `pip freeze` output into an installed set.
///
/// Blank lines (including the trailing one), comments and editable (`-e`)
/// entries are skipped; `name @ url` entries are recorded by name.
pub fn parse_freeze_output(output: &str) -> InstalledSet {
    let packages = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(|line| {
            let spec = PackageSpec::parse(line);
            if spec.is_none() {
                debug!(line, "unrecognized freeze line");
            }
            spec
        })
        .collect();

    InstalledSet::new(packages)
}

/// Snapshot of what is installed in an environment; empty when it does not exist yet
pub fn inspect<T: PythonToolchain + ?Sized>(
    store: &EnvironmentStore,
    id: &EnvironmentId,
    toolchain: &T,
) -> Result<InstalledSet, EnvironmentError> {
    if !store.exists(id) {
        return Ok(InstalledSet::empty());
    }

    let output = toolchain.freeze(&store.path(id))?;
    let installed = parse_freeze_output(&output);
    debug!(environment = %id, count = installed.len(), "inspected environment");
    Ok(installed)
}
