//! External Python tooling: virtualenv/venv, pip and the interpreter
//!
//! This module provides:
//! - The `PythonToolchain` seam the launcher talks to
//! - `SystemToolchain`, which shells out to the real tools

use crate::domain::PackageSpec;
use crate::error::EnvironmentError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};
use tracing::debug;

/// Result of installing a single package
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// The package that was requested
    pub package: PackageSpec,
    /// The command that was executed
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl InstallResult {
    /// Create a successful install result
    pub fn success(package: PackageSpec, command: String, stdout: String, stderr: String) -> Self {
        Self {
            package,
            command,
            success: true,
            stdout,
            stderr,
        }
    }

    /// Create a failed install result
    pub fn failure(package: PackageSpec, command: String, stdout: String, stderr: String) -> Self {
        Self {
            package,
            command,
            success: false,
            stdout,
            stderr,
        }
    }
}

/// Operations nowpy delegates to external Python tools
pub trait PythonToolchain {
    /// Create a fresh isolated environment at `env_dir`
    fn create_environment(&self, env_dir: &Path) -> Result<(), EnvironmentError>;

    /// Raw `pip freeze` output of the environment
    fn freeze(&self, env_dir: &Path) -> Result<String, EnvironmentError>;

    /// Install one package; failures are reported, never raised
    fn install(&self, env_dir: &Path, package: &PackageSpec) -> InstallResult;

    /// Uninstall the named packages
    fn uninstall(&self, env_dir: &Path, packages: &[String]) -> Result<(), EnvironmentError>;

    /// Run `script` with the environment's interpreter and return its exit code
    fn run_script(
        &self,
        env_dir: &Path,
        script: &Path,
        args: &[String],
    ) -> Result<i32, EnvironmentError>;
}

/// Toolchain that executes real commands
#[derive(Debug, Clone)]
pub struct SystemToolchain {
    /// Interpreter used to bootstrap new environments
    python: PathBuf,
}

impl SystemToolchain {
    /// Create a toolchain bootstrapping environments with `python`
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    /// Run a command and capture output
    fn run_command<S: AsRef<OsStr>>(&self, program: &Path, args: &[S]) -> std::io::Result<Output> {
        Command::new(program).args(args).output()
    }
}

impl Default for SystemToolchain {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl PythonToolchain for SystemToolchain {
    fn create_environment(&self, env_dir: &Path) -> Result<(), EnvironmentError> {
        // virtualenv is faster and seeds newer pip; the stdlib venv is the fallback
        let attempts: [&[&str]; 2] = [&["-m", "virtualenv", "-q"], &["-m", "venv"]];
        let mut last_error = String::new();

        for base in attempts {
            let mut args: Vec<&OsStr> = base.iter().map(OsStr::new).collect();
            args.push(env_dir.as_os_str());
            let command = command_line(&self.python, args.as_slice());

            match self.run_command(&self.python, args.as_slice()) {
                Ok(output) if output.status.success() => {
                    debug!(command = %command, "created environment");
                    return Ok(());
                }
                Ok(output) => {
                    last_error = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    debug!(command = %command, error = %last_error, "environment creation attempt failed");
                }
                Err(e) => {
                    last_error = e.to_string();
                    debug!(command = %command, error = %last_error, "environment creation attempt failed");
                }
            }
        }

        Err(EnvironmentError::create_failed(env_dir, last_error))
    }

    fn freeze(&self, env_dir: &Path) -> Result<String, EnvironmentError> {
        let pip = env_executable(env_dir, "pip");
        let command = command_line(&pip, &["freeze"]);

        let output = self
            .run_command(&pip, &["freeze"])
            .map_err(|e| EnvironmentError::spawn_failed(&command, e))?;

        if !output.status.success() {
            return Err(EnvironmentError::command_failed(
                command,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn install(&self, env_dir: &Path, package: &PackageSpec) -> InstallResult {
        let pip = env_executable(env_dir, "pip");
        let args = ["install".to_string(), package.to_string()];
        let command = command_line(&pip, &args);

        match self.run_command(&pip, &args) {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();

                if output.status.success() {
                    InstallResult::success(package.clone(), command, stdout, stderr)
                } else {
                    InstallResult::failure(package.clone(), command, stdout, stderr)
                }
            }
            Err(e) => InstallResult::failure(
                package.clone(),
                command,
                String::new(),
                format!("Failed to execute command: {}", e),
            ),
        }
    }

    fn uninstall(&self, env_dir: &Path, packages: &[String]) -> Result<(), EnvironmentError> {
        if packages.is_empty() {
            return Ok(());
        }

        let pip = env_executable(env_dir, "pip");
        let mut args = vec!["uninstall".to_string(), "-y".to_string()];
        args.extend(packages.iter().cloned());
        let command = command_line(&pip, args.as_slice());

        let output = self
            .run_command(&pip, args.as_slice())
            .map_err(|e| EnvironmentError::spawn_failed(&command, e))?;

        if !output.status.success() {
            return Err(EnvironmentError::command_failed(
                command,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }
        Ok(())
    }

    fn run_script(
        &self,
        env_dir: &Path,
        script: &Path,
        args: &[String],
    ) -> Result<i32, EnvironmentError> {
        let python = env_executable(env_dir, "python");
        let command = format!("{} {}", python.display(), script.display());

        let status = Command::new(&python)
            .arg(script)
            .args(args)
            .status()
            .map_err(|e| EnvironmentError::spawn_failed(&command, e))?;

        Ok(exit_code(status))
    }
}

/// Path of an executable inside an environment (`bin/` or `Scripts\`)
pub fn env_executable(env_dir: &Path, name: &str) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts").join(format!("{name}.exe"))
    } else {
        env_dir.join("bin").join(name)
    }
}

/// Exit code of a finished child; signals map to the shell's 128+N convention
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

fn command_line<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    let mut parts = vec![program.display().to_string()];
    parts.extend(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()));
    parts.join(" ")
}
