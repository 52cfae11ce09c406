//! Resolved runtime settings
//!
//! `Settings` turns parsed CLI arguments (and the environment variables clap
//! already folded into them) into concrete paths and limits.

use crate::cli::CliArgs;
use crate::environment::DEFAULT_STORE_DIR;
use crate::error::ConfigError;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding every environment
    pub store_root: PathBuf,
    /// Interpreter used to create environments
    pub python: PathBuf,
    /// Environments kept after pruning
    pub max_environments: usize,
    /// Manifest search stops here (the user's home directory)
    pub search_boundary: Option<PathBuf>,
    /// Working directory; it identifies the project environment
    pub project_dir: PathBuf,
    pub quiet: bool,
    pub verbose: bool,
}

impl Settings {
    pub fn from_cli(args: &CliArgs) -> Result<Self, ConfigError> {
        let home = dirs::home_dir();

        let store_root = match &args.home {
            Some(dir) => dir.clone(),
            None => home
                .as_ref()
                .map(|h| h.join(DEFAULT_STORE_DIR))
                .ok_or(ConfigError::HomeNotFound)?,
        };

        let project_dir =
            std::env::current_dir().map_err(|source| ConfigError::CurrentDir { source })?;

        Ok(Self {
            store_root,
            python: args.python.clone(),
            max_environments: args.max_envs,
            search_boundary: home,
            project_dir,
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }
}
