//! Launch orchestrator coordinating the whole workflow
//!
//! This module provides:
//! - Workflow coordination: locate manifest → scan → ensure environment →
//!   prune → inspect → reconcile → install → run
//! - Side-effect free planning for dry runs
//! - Resetting a project's environment

use crate::config::Settings;
use crate::domain::{ImportSet, InstalledSet, ManifestKind, MissingSet, PackageSpec};
use crate::environment::{
    self, inspect, EnvironmentId, EnvironmentStore, InstallResult, PruneReport, PythonToolchain,
};
use crate::error::AppError;
use crate::manifest::{find_declared, Manifest, ManifestLocator};
use crate::progress::Progress;
use crate::reconcile::reconcile;
use crate::scanner::{scan_file, third_party, to_distributions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything nowpy would do for a script, computed without side effects
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub script: PathBuf,
    /// Manifest the declared packages came from
    pub manifest: Option<(PathBuf, ManifestKind)>,
    pub declared: Vec<PackageSpec>,
    /// Third-party distributions imported by the script
    pub imports: ImportSet,
    pub environment: EnvironmentId,
    pub environment_path: PathBuf,
    pub environment_exists: bool,
    pub installed: InstalledSet,
    pub missing: MissingSet,
}

/// Result of a full launch
#[derive(Debug)]
pub struct LaunchOutcome {
    pub environment: EnvironmentId,
    /// Whether the environment was created by this run
    pub created: bool,
    pub pruned: PruneReport,
    pub installs: Vec<InstallResult>,
    /// Exit code of the script
    pub exit_code: i32,
}

impl LaunchOutcome {
    /// Packages whose installation failed
    pub fn failed_installs(&self) -> impl Iterator<Item = &InstallResult> {
        self.installs.iter().filter(|r| !r.success)
    }
}

/// Result of `--reset`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The project has no environment; nothing was done
    NoEnvironment,
    /// Names of the packages that were uninstalled
    Removed(Vec<String>),
}

/// Runs scripts inside their project's environment
pub struct Launcher<T: PythonToolchain> {
    settings: Settings,
    store: EnvironmentStore,
    locator: ManifestLocator,
    toolchain: T,
}

impl<T: PythonToolchain> Launcher<T> {
    pub fn new(settings: Settings, toolchain: T) -> Self {
        let store = EnvironmentStore::new(&settings.store_root);
        let locator = ManifestLocator::new(settings.search_boundary.clone());
        Self {
            settings,
            store,
            locator,
            toolchain,
        }
    }

    pub fn store(&self) -> &EnvironmentStore {
        &self.store
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Environment belonging to the current project directory
    pub fn environment_id(&self) -> EnvironmentId {
        self.store.locate(&self.settings.project_dir)
    }

    /// Declared packages and third-party imports of a script.
    ///
    /// Fails before any environment work when the script cannot be read or parsed.
    fn resolve(&self, script: &Path) -> Result<(Option<Manifest>, ImportSet), AppError> {
        let manifest = find_declared(&self.locator, script);
        let imports = scan_file(script)?;
        let imports = to_distributions(&third_party(&imports, script));
        debug!(imports = ?imports, "third-party imports");
        Ok((manifest, imports))
    }

    /// Compute the install plan without creating or changing anything
    pub fn plan(&self, script: &Path) -> Result<LaunchPlan, AppError> {
        let (manifest, imports) = self.resolve(script)?;
        let id = self.environment_id();
        let installed = inspect(&self.store, &id, &self.toolchain)?;

        let declared = manifest
            .as_ref()
            .map(|m| m.packages.clone())
            .unwrap_or_default();
        let missing = reconcile(&declared, &imports, &installed);

        Ok(LaunchPlan {
            script: script.to_path_buf(),
            manifest: manifest.map(|m| (m.path, m.kind)),
            declared,
            imports,
            environment_path: self.store.path(&id),
            environment_exists: self.store.exists(&id),
            environment: id,
            installed,
            missing,
        })
    }

    /// Prepare the environment for `script`, install what is missing and run it
    pub fn launch(&self, script: &Path, args: &[String]) -> Result<LaunchOutcome, AppError> {
        let mut progress = Progress::new(!self.settings.quiet);

        let (manifest, imports) = self.resolve(script)?;
        let declared = manifest.map(|m| m.packages).unwrap_or_default();

        let id = self.environment_id();
        let env_dir = self.store.path(&id);

        if !self.store.exists(&id) {
            progress.status("Creating venv...");
            progress.spinner(&format!("Building {}", id));
        }
        let created = self
            .store
            .create(&id, &self.settings.project_dir, &self.toolchain);
        progress.finish_and_clear();
        let created = created?;
        if let Err(e) = self.store.touch(&id, &self.settings.project_dir) {
            warn!("cannot record environment use: {}", e);
        }

        let pruned = self.store.prune(self.settings.max_environments, &id);
        for (pruned_id, reason) in &pruned.failed {
            progress.warn(&format!("cannot clean up {}: {}", pruned_id, reason));
        }

        let installed = inspect(&self.store, &id, &self.toolchain)?;
        let missing = reconcile(&declared, &imports, &installed);
        info!(environment = %id, missing = missing.len(), "reconciled dependencies");

        let installs = self.install_with_progress(&mut progress, &env_dir, &missing);
        for failed in installs.iter().filter(|r| !r.success) {
            progress.warn(&format!("failed to install {}", failed.package));
        }

        progress.status("Running script...");
        let exit_code = environment::run(&self.toolchain, &env_dir, script, args)?;

        Ok(LaunchOutcome {
            environment: id,
            created,
            pruned,
            installs,
            exit_code,
        })
    }

    fn install_with_progress(
        &self,
        progress: &mut Progress,
        env_dir: &Path,
        missing: &MissingSet,
    ) -> Vec<InstallResult> {
        if missing.is_empty() {
            return Vec::new();
        }

        progress.start(missing.len() as u64, "Installing");
        let results = environment::install(&self.toolchain, env_dir, missing, |result| {
            progress.set_message(&format!("Installed {}", result.package));
            progress.inc();
        });
        progress.finish_and_clear();
        results
    }

    /// Uninstall every package from the current project's environment
    pub fn reset(&self) -> Result<ResetOutcome, AppError> {
        let id = self.environment_id();
        if !self.store.exists(&id) {
            debug!(environment = %id, "no environment to reset");
            return Ok(ResetOutcome::NoEnvironment);
        }

        let installed = inspect(&self.store, &id, &self.toolchain)?;
        let names: Vec<String> = installed.packages().iter().map(|p| p.name.clone()).collect();

        self.toolchain.uninstall(&self.store.path(&id), &names)?;
        info!(environment = %id, count = names.len(), "environment reset");
        Ok(ResetOutcome::Removed(names))
    }
}
