//! CLI argument definitions and `LaunchProfile` construction.
use std::ffi::OsString;

use anyhow::Result;
use clap::Parser;

use super::{resolve_base_dir_override, resolve_config_source, resolve_dry_run, LaunchProfile};
use crate::lib::errors::ConfigError;

const BIN_NAME: &str = "serial-plotter-launcher";
const ESCAPE: &str = "--";

/// Command-line arguments.
///
/// The launcher owns no flags: everything after the binary name, including
/// `--help`, `--version` and `--`, belongs to the delegated program.
#[derive(Debug, Clone, Parser)]
#[command(
    name = BIN_NAME,
    author,
    version,
    about = "Run serial_plotter.py inside its virtual environment",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct LaunchArgs {
    /// Arguments forwarded verbatim to the delegated program.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub forwarded: Vec<OsString>,
}

impl LaunchArgs {
    /// Parse the process arguments.
    pub fn from_env() -> Result<Self> {
        Self::from_os_args(std::env::args_os())
    }

    /// Parse an argv (binary name first).
    ///
    /// An escape is injected after the binary name so clap treats every
    /// remaining token as a value, a literal `--` included.
    pub fn from_os_args<I, T>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let bin = argv.next().unwrap_or_else(|| OsString::from(BIN_NAME));
        let escaped = std::iter::once(bin)
            .chain(std::iter::once(OsString::from(ESCAPE)))
            .chain(argv);
        Ok(Self::try_parse_from(escaped)?)
    }

    /// Build a `LaunchProfile` from the forwarded args and environment variables.
    pub fn into_profile(self) -> Result<LaunchProfile, ConfigError> {
        Ok(LaunchProfile {
            config_source: resolve_config_source(),
            base_dir_override: resolve_base_dir_override()?,
            dry_run: resolve_dry_run(),
            forwarded_args: self.forwarded,
        })
    }
}
