//! CLI argument parsing module for nowpy

use clap::Parser;
use std::path::PathBuf;

/// Run a Python script with its dependencies installed on the fly
#[derive(Parser, Debug, Clone)]
#[command(
    name = "nowpy",
    about = "Run a Python script with its dependencies installed on the fly",
    disable_version_flag = true
)]
pub struct CliArgs {
    /// Python script to run, followed by the arguments passed through to it.
    /// Everything after the script is forwarded verbatim, flags included.
    #[arg(
        value_name = "SCRIPT [ARGS]",
        num_args = 1..,
        trailing_var_arg = true,
        required_unless_present_any = ["reset", "print_version"]
    )]
    pub command: Vec<String>,

    /// Uninstall every package from this directory's environment and exit
    #[arg(long)]
    pub reset: bool,

    /// Print version
    #[arg(short = 'V', long = "version")]
    pub print_version: bool,

    // General options
    /// Show the install plan without creating environments or running anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the dry-run plan as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - only errors and the script's own output
    #[arg(short, long)]
    pub quiet: bool,

    // Environment options
    /// Interpreter used to create new environments
    #[arg(long, env = "NOWPY_PYTHON", default_value = "python3")]
    pub python: PathBuf,

    /// Directory holding the environments (default: ~/.nowpy)
    #[arg(long, env = "NOWPY_HOME")]
    pub home: Option<PathBuf>,

    /// Number of environments kept before the least recently used are removed
    #[arg(long = "max-envs", env = "NOWPY_MAX_ENVS", default_value_t = crate::environment::DEFAULT_RETENTION)]
    pub max_envs: usize,
}

impl CliArgs {
    /// The script to run, if one was given
    pub fn script(&self) -> Option<PathBuf> {
        self.command.first().map(PathBuf::from)
    }

    /// Arguments forwarded to the script
    pub fn script_args(&self) -> &[String] {
        self.command.get(1..).unwrap_or(&[])
    }
}
