//! nowpy - run a Python script with its dependencies installed on the fly
//!
//! Finds the script's requirements.txt or pyproject.toml, scans its imports,
//! installs whatever is missing into a per-project environment and runs it.

use anyhow::Context;
use clap::Parser;
use nowpy::cli::CliArgs;
use nowpy::config::Settings;
use nowpy::environment::SystemToolchain;
use nowpy::error::ConfigError;
use nowpy::observability::init_tracing;
use nowpy::orchestrator::{Launcher, ResetOutcome};
use nowpy::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Handle version flag
    if args.print_version {
        println!("nowpy {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_tracing(args.verbose, args.quiet);

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let settings = Settings::from_cli(&args)?;

    if args.verbose {
        eprintln!("nowpy v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Project: {}", settings.project_dir.display());
        eprintln!("Store: {}", settings.store_root.display());
    }

    let toolchain = SystemToolchain::new(settings.python.clone());
    let launcher = Launcher::new(settings, toolchain);

    if args.reset {
        match launcher.reset().context("reset failed")? {
            ResetOutcome::NoEnvironment => {
                if !args.quiet {
                    eprintln!("No environment for this directory; nothing to reset");
                }
            }
            ResetOutcome::Removed(names) => {
                if !args.quiet {
                    eprintln!("Uninstalled {} package(s)", names.len());
                }
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let script = args.script().ok_or(ConfigError::MissingScript)?;

    if args.dry_run {
        let plan = launcher.plan(&script)?;
        let formatter =
            create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));
        let mut stdout = io::stdout().lock();
        formatter.format(&plan, &mut stdout)?;
        stdout.flush()?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = launcher.launch(&script, args.script_args())?;

    if args.verbose {
        for failed in outcome.failed_installs() {
            eprintln!("  install failed: {}", failed.command);
            if !failed.stderr.is_empty() {
                eprintln!("    {}", failed.stderr.trim());
            }
        }
    }

    Ok(ExitCode::from(u8::try_from(outcome.exit_code).unwrap_or(1)))
}
