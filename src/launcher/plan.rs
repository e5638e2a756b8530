use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Serialize;

use crate::{
    launcher::{
        config::LauncherSection,
        environment::{resolve_base_dir, ActivatedEnvironment},
    },
    lib::{errors::LaunchError, fs::is_existing_file},
};

/// Everything needed to run the delegated program once.
#[derive(Debug)]
pub struct LaunchPlan {
    pub base_dir: PathBuf,
    pub environment: ActivatedEnvironment,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub shutdown_grace: Duration,
}

/// JSON view of a plan, printed for dry runs.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LaunchPlanSummary {
    pub base_dir: String,
    pub environment: String,
    pub activation_script: String,
    pub interpreter: String,
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchPlan {
    /// Resolve base directory, environment and program, in that order.
    pub fn resolve(section: &LauncherSection, args: Vec<OsString>) -> Result<Self, LaunchError> {
        let base_dir = resolve_base_dir(&section.base_dir)?;
        let environment =
            ActivatedEnvironment::acquire(&base_dir, &section.env_subpath, &section.interpreter)?;
        let program = resolve_program(&base_dir, &section.program)?;

        Ok(Self {
            base_dir,
            environment,
            program,
            args,
            shutdown_grace: Duration::from_secs(section.shutdown_grace_secs),
        })
    }

    pub fn summary(&self) -> LaunchPlanSummary {
        LaunchPlanSummary {
            base_dir: self.base_dir.display().to_string(),
            environment: self.environment.root().display().to_string(),
            activation_script: self
                .environment
                .activation_script()
                .display()
                .to_string(),
            interpreter: self.environment.interpreter().display().to_string(),
            program: self.program.display().to_string(),
            args: self
                .args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// `<base>/<program>` must be an existing file.
pub fn resolve_program(base: &Path, program: &Path) -> Result<PathBuf, LaunchError> {
    let path = base.join(program);
    if is_existing_file(&path) {
        Ok(path)
    } else {
        Err(LaunchError::ProgramNotFound { path })
    }
}
