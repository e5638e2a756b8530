//! LaunchProfile and environment-driven setting resolution.
use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::{
    launcher::config::{BaseDirMode, ConfigSource, CONFIG_ENV_KEY, DEFAULT_CONFIG_PATH},
    lib::errors::ConfigError,
};

const BASE_DIR_ENV: &str = "SERIAL_PLOTTER_BASE_DIR";
const DRY_RUN_ENV: &str = "SERIAL_PLOTTER_DRY_RUN";

/// Resolved launch profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchProfile {
    pub config_source: ConfigSource,
    pub base_dir_override: Option<BaseDirMode>,
    pub dry_run: bool,
    /// Arguments handed to the delegated program, in invocation order.
    pub forwarded_args: Vec<OsString>,
}

/// Resolve the config file in the order: env var → `./launcher.toml`.
pub fn resolve_config_source() -> ConfigSource {
    let cwd = env::current_dir().unwrap_or_default();
    resolve_config_source_from(non_empty_env_os(CONFIG_ENV_KEY), &cwd)
}

/// Resolve the config source from explicit values (testable helper).
pub fn resolve_config_source_from(explicit: Option<PathBuf>, cwd: &Path) -> ConfigSource {
    match explicit {
        Some(path) => ConfigSource::Explicit(absolutize(path, cwd)),
        None => ConfigSource::Default(absolutize(PathBuf::from(DEFAULT_CONFIG_PATH), cwd)),
    }
}

/// Read `SERIAL_PLOTTER_BASE_DIR`, if set.
pub fn resolve_base_dir_override() -> Result<Option<BaseDirMode>, ConfigError> {
    resolve_base_dir_override_from(env::var(BASE_DIR_ENV).ok())
}

/// Parse a base directory override from an explicit value (testable helper).
pub fn resolve_base_dir_override_from(
    value: Option<String>,
) -> Result<Option<BaseDirMode>, ConfigError> {
    match value {
        Some(raw) if !raw.trim().is_empty() => BaseDirMode::parse(&raw)
            .map(Some)
            .map_err(|message| ConfigError::InvalidEnv {
                key: BASE_DIR_ENV,
                message,
            }),
        _ => Ok(None),
    }
}

/// Read `SERIAL_PLOTTER_DRY_RUN`.
pub fn resolve_dry_run() -> bool {
    is_truthy(env::var(DRY_RUN_ENV).ok().as_deref())
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

fn non_empty_env_os(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn absolutize(path: PathBuf, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
