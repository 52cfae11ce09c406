//! JSON output formatter for machine processing

use crate::orchestrator::LaunchPlan;
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of a plan
#[derive(Serialize)]
struct JsonPlan {
    dry_run: bool,
    script: String,
    manifest: Option<JsonManifest>,
    environment: JsonEnvironment,
    /// Third-party distributions imported by the script
    imports: Vec<String>,
    /// Declared packages (only in verbose mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    declared: Option<Vec<String>>,
    /// Installed packages (only in verbose mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    installed: Option<Vec<String>>,
    /// Packages that would be installed
    missing: Vec<String>,
}

#[derive(Serialize)]
struct JsonManifest {
    path: String,
    kind: String,
}

#[derive(Serialize)]
struct JsonEnvironment {
    id: String,
    path: String,
    exists: bool,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, plan: &LaunchPlan, writer: &mut dyn Write) -> std::io::Result<()> {
        let verbose = self.verbosity == Verbosity::Verbose;

        let output = JsonPlan {
            dry_run: true,
            script: plan.script.display().to_string(),
            manifest: plan.manifest.as_ref().map(|(path, kind)| JsonManifest {
                path: path.display().to_string(),
                kind: kind.filename().to_string(),
            }),
            environment: JsonEnvironment {
                id: plan.environment.to_string(),
                path: plan.environment_path.display().to_string(),
                exists: plan.environment_exists,
            },
            imports: plan.imports.iter().map(str::to_string).collect(),
            declared: verbose.then(|| plan.declared.iter().map(ToString::to_string).collect()),
            installed: verbose.then(|| {
                plan.installed
                    .packages()
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            }),
            missing: plan.missing.to_strings(),
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
