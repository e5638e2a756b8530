//! Load and validate launcher configuration.
use std::path::PathBuf;

use serde::Deserialize;
use tracing::error;

use crate::lib::errors::ConfigError;

pub mod launcher;
pub mod telemetry;

pub use launcher::{
    parse_launcher_section, BaseDirMode, LauncherSection, RawLauncherSection,
    DEFAULT_ENV_SUBPATH, DEFAULT_INTERPRETER, DEFAULT_PROGRAM, DEFAULT_SHUTDOWN_GRACE_SECS,
};

pub const CONFIG_ENV_KEY: &str = "SERIAL_PLOTTER_LAUNCHER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "launcher.toml";

/// Where the configuration file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named explicitly; the file must exist.
    Explicit(PathBuf),
    /// Conventional location; a missing file means built-in defaults.
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Default(path) => path,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, ConfigSource::Explicit(_))
    }
}

/// Top-level configuration container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LauncherConfig {
    pub launcher: LauncherSection,
    /// File the settings were read from, if one existed.
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawLauncherConfig {
    launcher: Option<RawLauncherSection>,
}

impl LauncherConfig {
    /// Load configuration from a resolved source.
    pub fn load(source: &ConfigSource) -> Result<Self, ConfigError> {
        telemetry::log_env_source(source.path(), source.is_required());
        let path = source.path().clone();

        let builder = config::Config::builder().add_source(
            config::File::from(path.as_path())
                .format(config::FileFormat::Toml)
                .required(source.is_required()),
        );
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "serial_plotter_launcher::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawLauncherConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "serial_plotter_launcher::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let launcher = parse_launcher_section(raw.launcher, &path).map_err(|err| {
            error!(
                target: "serial_plotter_launcher::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        let config = Self {
            launcher,
            source_path: path.is_file().then_some(path),
        };
        telemetry::log_loaded(&config);
        Ok(config)
    }

    /// Replace the configured base directory mode (environment override).
    pub fn with_base_dir(mut self, base_dir: Option<BaseDirMode>) -> Self {
        if let Some(mode) = base_dir {
            self.launcher.base_dir = mode;
        }
        self
    }
}
