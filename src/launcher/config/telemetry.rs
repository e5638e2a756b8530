use std::path::Path;

use tracing::{debug, info};

use super::{LauncherConfig, CONFIG_ENV_KEY, DEFAULT_CONFIG_PATH};

pub fn log_env_source(path: &Path, from_env: bool) {
    if from_env {
        info!(
            target: "serial_plotter_launcher::config",
            path = %path.display(),
            "Loading configuration using SERIAL_PLOTTER_LAUNCHER_CONFIG environment variable"
        );
    } else {
        debug!(
            target: "serial_plotter_launcher::config",
            path = %path.display(),
            env = CONFIG_ENV_KEY,
            default = DEFAULT_CONFIG_PATH,
            "SERIAL_PLOTTER_LAUNCHER_CONFIG not set; using optional launcher.toml"
        );
    }
}

pub fn log_loaded(config: &LauncherConfig) {
    match &config.source_path {
        Some(path) => info!(
            target: "serial_plotter_launcher::config",
            path = %path.display(),
            base_dir = %config.launcher.base_dir,
            env_subpath = %config.launcher.env_subpath.display(),
            program = %config.launcher.program.display(),
            interpreter = %config.launcher.interpreter,
            "Configuration file loaded successfully"
        ),
        None => debug!(
            target: "serial_plotter_launcher::config",
            base_dir = %config.launcher.base_dir,
            "No configuration file found; using built-in defaults"
        ),
    }
}
