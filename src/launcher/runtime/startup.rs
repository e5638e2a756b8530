use std::process::ExitCode;

use anyhow::Error;
use tracing::info;

use crate::{
    cli::LaunchProfile,
    launcher::{config::LauncherConfig, delegate::run_delegate, plan::LaunchPlan},
    lib::errors::{exit_codes, ConfigError, LaunchError},
};

/// Bundles a runtime error message with an exit code.
#[derive(Debug)]
pub struct RuntimeExit {
    message: Option<String>,
    exit_code: u8,
}

impl RuntimeExit {
    /// Exit with the given code without printing anything.
    pub fn silent(exit_code: u8) -> Self {
        Self {
            message: None,
            exit_code,
        }
    }

    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: Some(format!("{err:#}")),
            exit_code: 1,
        }
    }

    pub fn from_config_error(err: ConfigError) -> Self {
        Self {
            message: Some(err.to_string()),
            exit_code: exit_codes::CONFIG,
        }
    }

    pub fn from_launch_error(err: LaunchError) -> Self {
        let exit_code = err.exit_code();
        if err.is_delegate_status() {
            return Self::silent(exit_code);
        }
        Self {
            message: Some(err.to_string()),
            exit_code,
        }
    }

    pub fn report(self) -> ExitCode {
        if let Some(message) = &self.message {
            eprintln!("{message}");
        }
        ExitCode::from(self.exit_code)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<ConfigError> for RuntimeExit {
    fn from(err: ConfigError) -> Self {
        Self::from_config_error(err)
    }
}

impl From<LaunchError> for RuntimeExit {
    fn from(err: LaunchError) -> Self {
        Self::from_launch_error(err)
    }
}

/// Resolve the plan and run the delegated program once.
///
/// The activated environment lives inside the plan and is released when the
/// plan goes out of scope, on every return path.
pub async fn run_launcher(
    profile: LaunchProfile,
    config: LauncherConfig,
) -> Result<(), RuntimeExit> {
    let config = config.with_base_dir(profile.base_dir_override);
    let plan = LaunchPlan::resolve(&config.launcher, profile.forwarded_args)?;

    if profile.dry_run {
        let summary =
            serde_json::to_string_pretty(&plan.summary()).map_err(RuntimeExit::from_error)?;
        println!("{summary}");
        return Ok(());
    }

    info!(
        target: "serial_plotter_launcher::runtime",
        base_dir = %plan.base_dir.display(),
        environment = %plan.environment.root().display(),
        program = %plan.program.display(),
        "Launching delegated program"
    );
    let outcome = run_delegate(&plan).await?;
    drop(plan);
    outcome.into_result().map_err(RuntimeExit::from)
}
