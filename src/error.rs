//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues reading or parsing dependency manifests
//! - ScanError: Issues reading or parsing the target script
//! - EnvironmentError: Failures of the virtualenv, pip or the script process
//! - ConfigError: Issues with CLI configuration

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Script scanning errors
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Environment and subprocess errors
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error (for pyproject.toml)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },
}

/// Errors raised while scanning a script for imports
#[derive(Error, Debug)]
pub enum ScanError {
    /// Failed to read the script
    #[error("failed to read script {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The script is not valid Python
    #[error("failed to parse {path}: {message}")]
    SyntaxError { path: PathBuf, message: String },
}

/// Errors related to the isolated environment and external tools
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// Neither virtualenv nor venv could create the environment
    #[error("failed to create environment at {path}: {message}")]
    CreateFailed { path: PathBuf, message: String },

    /// An external command ran but reported failure
    #[error("command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// An external command could not be started
    #[error("failed to execute '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem operation inside the environment store failed
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No home directory to place the environment store in
    #[error("cannot determine home directory; set NOWPY_HOME or pass --home")]
    HomeNotFound,

    /// The working directory could not be determined
    #[error("cannot determine current directory: {source}")]
    CurrentDir {
        #[source]
        source: std::io::Error,
    },

    /// No script given for a run
    #[error("no script given")]
    MissingScript,
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ScanError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new SyntaxError
    pub fn syntax_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ScanError::SyntaxError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl EnvironmentError {
    /// Creates a new CreateFailed error
    pub fn create_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        EnvironmentError::CreateFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new CommandFailed error
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        EnvironmentError::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a new SpawnFailed error
    pub fn spawn_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        EnvironmentError::SpawnFailed {
            command: command.into(),
            source,
        }
    }

    /// Creates a new Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EnvironmentError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_toml_parse() {
        let err = ManifestError::toml_parse_error("/path/to/pyproject.toml", "invalid key");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse TOML"));
        assert!(msg.contains("invalid key"));
    }

    #[test]
    fn test_manifest_error_read() {
        let err = ManifestError::read_error(
            "/path/to/requirements.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = format!("{}", err);
        assert!(msg.contains("failed to read manifest file"));
        assert!(msg.contains("requirements.txt"));
    }

    #[test]
    fn test_scan_error_syntax() {
        let err = ScanError::syntax_error("script.py", "unexpected EOF");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse script.py"));
        assert!(msg.contains("unexpected EOF"));
    }

    #[test]
    fn test_environment_error_create_failed() {
        let err = EnvironmentError::create_failed("/envs/venv_1234abcd", "No module named venv");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to create environment"));
        assert!(msg.contains("venv_1234abcd"));
    }

    #[test]
    fn test_environment_error_command_failed() {
        let err = EnvironmentError::command_failed("pip uninstall -y a", "exit status 1");
        let msg = format!("{}", err);
        assert!(msg.contains("pip uninstall -y a"));
        assert!(msg.contains("exit status 1"));
    }

    #[test]
    fn test_config_error_home_not_found() {
        let msg = format!("{}", ConfigError::HomeNotFound);
        assert!(msg.contains("NOWPY_HOME"));
    }

    #[test]
    fn test_app_error_from_scan_error() {
        let app_err: AppError = ScanError::syntax_error("a.py", "bad").into();
        assert!(matches!(app_err, AppError::Scan(_)));
        assert!(format!("{}", app_err).contains("failed to parse a.py"));
    }

    #[test]
    fn test_app_error_from_environment_error() {
        let app_err: AppError = EnvironmentError::command_failed("pip freeze", "boom").into();
        assert!(format!("{}", app_err).contains("pip freeze"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::MissingScript.into();
        assert_eq!(format!("{}", app_err), "no script given");
    }

    #[test]
    fn test_error_debug_trait() {
        let err = ScanError::syntax_error("/test.py", "x");
        let debug = format!("{:?}", err);
        assert!(debug.contains("SyntaxError"));
    }
}
