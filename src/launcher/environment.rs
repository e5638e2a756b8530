//! Base directory resolution and virtual environment activation.
//!
//! Activation never touches the launcher's own process environment. It
//! computes the variables an `activate` script would export and hands them to
//! the child command as an overlay; dropping [`ActivatedEnvironment`] is the
//! deactivation.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    launcher::config::BaseDirMode,
    lib::{
        errors::LaunchError,
        fs::{
            activation_script, executable_dir, interpreter_path, is_existing_dir,
            is_existing_file, venv_bin_dir,
        },
        interpreter::EnvironmentOverlay,
    },
};

const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
const VIRTUAL_ENV_PROMPT: &str = "VIRTUAL_ENV_PROMPT";
const PYTHONHOME: &str = "PYTHONHOME";
const PATH: &str = "PATH";
#[cfg(windows)]
const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_SEPARATOR: &str = ":";

/// Resolve the install directory for the configured mode.
pub fn resolve_base_dir(mode: &BaseDirMode) -> Result<PathBuf, LaunchError> {
    let base = match mode {
        BaseDirMode::Fixed(path) => path.clone(),
        BaseDirMode::CurrentDir => {
            env::current_dir().map_err(|err| LaunchError::BaseDirUnavailable {
                reason: format!("current directory is not accessible: {err}"),
            })?
        }
        BaseDirMode::ExecutableDir => {
            executable_dir().map_err(|err| LaunchError::BaseDirUnavailable {
                reason: format!("launcher location is not accessible: {err}"),
            })?
        }
    };

    info!(
        target: "serial_plotter_launcher::environment",
        mode = %mode,
        base_dir = %base.display(),
        "Resolved base directory"
    );
    Ok(base)
}

/// An isolated interpreter environment, active for child commands built from it.
#[derive(Debug)]
pub struct ActivatedEnvironment {
    root: PathBuf,
    activation_script: PathBuf,
    interpreter: PathBuf,
    overlay: EnvironmentOverlay,
}

impl ActivatedEnvironment {
    /// Locate `<base>/<env_subpath>` and compute its activation overlay.
    pub fn acquire(
        base: &Path,
        env_subpath: &Path,
        interpreter: &str,
    ) -> Result<Self, LaunchError> {
        Self::acquire_with_path(base, env_subpath, interpreter, env::var_os(PATH))
    }

    /// Same as [`acquire`](Self::acquire) with an explicit inherited `PATH`.
    pub fn acquire_with_path(
        base: &Path,
        env_subpath: &Path,
        interpreter: &str,
        inherited_path: Option<OsString>,
    ) -> Result<Self, LaunchError> {
        let root = base.join(env_subpath);
        let activation_script = activation_script(&root);
        if !is_existing_dir(&root) || !is_existing_file(&activation_script) {
            return Err(LaunchError::EnvironmentNotFound {
                path: activation_script,
            });
        }

        let interpreter = interpreter_path(&root, interpreter);
        if !is_existing_file(&interpreter) {
            return Err(LaunchError::InterpreterNotFound { path: interpreter });
        }

        let overlay = build_overlay(&root, inherited_path);
        debug!(
            target: "serial_plotter_launcher::environment",
            root = %root.display(),
            activation_script = %activation_script.display(),
            interpreter = %interpreter.display(),
            "Activated virtual environment"
        );

        Ok(Self {
            root,
            activation_script,
            interpreter,
            overlay,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn activation_script(&self) -> &Path {
        &self.activation_script
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    pub fn overlay(&self) -> &EnvironmentOverlay {
        &self.overlay
    }
}

impl Drop for ActivatedEnvironment {
    fn drop(&mut self) {
        debug!(
            target: "serial_plotter_launcher::environment",
            root = %self.root.display(),
            "Released virtual environment"
        );
    }
}

/// The inherited `PATH` is kept byte-for-byte behind the environment's bin dir,
/// the same prefixing `activate` does.
fn build_overlay(root: &Path, inherited_path: Option<OsString>) -> EnvironmentOverlay {
    let mut path = venv_bin_dir(root).into_os_string();
    if let Some(inherited) = inherited_path.filter(|value| !value.is_empty()) {
        path.push(PATH_SEPARATOR);
        path.push(inherited);
    }

    let prompt = root
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| root.as_os_str().to_os_string());

    let mut overlay = EnvironmentOverlay::default();
    overlay
        .set
        .insert(OsString::from(VIRTUAL_ENV), root.as_os_str().to_os_string());
    overlay.set.insert(OsString::from(VIRTUAL_ENV_PROMPT), prompt);
    overlay.set.insert(OsString::from(PATH), path);
    overlay.remove.push(OsString::from(PYTHONHOME));
    overlay
}
