//! Isolated per-project Python environments
//!
//! This module provides:
//! - `EnvironmentStore`: where environments live, creation and LRU pruning
//! - `PythonToolchain`: the seam to virtualenv, pip and the interpreter
//! - Inspection of installed packages and best-effort installation

mod inspector;
mod metadata;
mod store;
mod toolchain;

pub use inspector::{inspect, parse_freeze_output};
pub use metadata::{EnvironmentMetadata, METADATA_FILE};
pub use store::{
    EnvironmentId, EnvironmentStore, PruneReport, StoredEnvironment, DEFAULT_RETENTION,
    DEFAULT_STORE_DIR,
};
pub use toolchain::{env_executable, exit_code, InstallResult, PythonToolchain, SystemToolchain};

use crate::domain::MissingSet;
use crate::error::EnvironmentError;
use std::path::Path;
use tracing::debug;

/// Install every missing package, one installer call each.
///
/// A failed install does not stop the remaining ones; reporting it to the
/// user is left to the caller. `on_each` sees every result as it arrives.
pub fn install<T, F>(
    toolchain: &T,
    env_dir: &Path,
    missing: &MissingSet,
    mut on_each: F,
) -> Vec<InstallResult>
where
    T: PythonToolchain + ?Sized,
    F: FnMut(&InstallResult),
{
    let mut results = Vec::with_capacity(missing.len());

    for package in missing.iter() {
        let result = toolchain.install(env_dir, package);
        debug!(command = %result.command, stdout = %result.stdout.trim(), "installer output");

        if !result.success {
            debug!(package = %package, stderr = %result.stderr.trim(), "install failed");
        }
        on_each(&result);
        results.push(result);
    }

    results
}

/// Run `script` with the environment's interpreter and return its exit code
pub fn run<T: PythonToolchain + ?Sized>(
    toolchain: &T,
    env_dir: &Path,
    script: &Path,
    args: &[String],
) -> Result<i32, EnvironmentError> {
    debug!(script = %script.display(), args = ?args, "running script");
    toolchain.run_script(env_dir, script, args)
}
