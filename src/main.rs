//! Entry point for the serial plotter launcher.
use std::process::ExitCode;

use serial_plotter_launcher::{
    cli::LaunchArgs,
    launcher::{
        config::LauncherConfig,
        runtime::{self, RuntimeExit},
    },
    lib::telemetry,
};

#[tokio::main]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<(), RuntimeExit> {
    telemetry::init_tracing().map_err(RuntimeExit::from_error)?;
    let args = LaunchArgs::from_env().map_err(RuntimeExit::from_error)?;
    let profile = args.into_profile()?;
    let config = LauncherConfig::load(&profile.config_source)?;
    runtime::run_launcher(profile, config).await
}
