use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
    /// Environment variable override failed validation.
    #[error("Environment variable {key} is invalid: {message}")]
    InvalidEnv { key: &'static str, message: String },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Failures raised while resolving or running a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Base directory could not be resolved: {reason}")]
    BaseDirUnavailable { reason: String },
    #[error("Virtual environment not found: {path} does not exist")]
    EnvironmentNotFound { path: PathBuf },
    #[error("Interpreter not found in virtual environment: {path}")]
    InterpreterNotFound { path: PathBuf },
    #[error("Delegated program not found: {path}")]
    ProgramNotFound { path: PathBuf },
    #[error("Failed to start {interpreter}: {source}")]
    SpawnFailed {
        interpreter: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed while waiting for the delegated program: {source}")]
    Wait {
        #[source]
        source: io::Error,
    },
    #[error("Delegated program exited with status {exit_code}")]
    DelegateFailed { exit_code: i32 },
}

/// Process exit codes reserved for the launcher's own failures.
pub mod exit_codes {
    /// Configuration file or environment override was rejected.
    pub const CONFIG: u8 = 2;
    /// Interpreter exists but could not be executed.
    pub const SPAWN_FAILED: u8 = 126;
    /// Environment, interpreter or delegated program is missing.
    pub const NOT_FOUND: u8 = 127;
    /// Conventional shell base for "terminated by signal N".
    pub const SIGNAL_BASE: i32 = 128;
    /// Interrupted before a child status could be observed.
    pub const INTERRUPTED: u8 = 130;
}

impl LaunchError {
    /// Exit code the launcher reports for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchError::EnvironmentNotFound { .. }
            | LaunchError::InterpreterNotFound { .. }
            | LaunchError::ProgramNotFound { .. } => exit_codes::NOT_FOUND,
            LaunchError::SpawnFailed { .. } => exit_codes::SPAWN_FAILED,
            LaunchError::BaseDirUnavailable { .. } => exit_codes::CONFIG,
            LaunchError::Wait { .. } => 1,
            LaunchError::DelegateFailed { exit_code } => truncate_exit_code(*exit_code),
        }
    }

    /// True when the failure already surfaced through the delegate's own output.
    pub fn is_delegate_status(&self) -> bool {
        matches!(self, LaunchError::DelegateFailed { .. })
    }
}

/// Map a raw status code onto the 0..=255 range the OS reports.
pub fn truncate_exit_code(code: i32) -> u8 {
    (code & 0xff) as u8
}
