//! Shared helpers for building the interpreter command.

use std::{
    collections::BTreeMap,
    ffi::{OsStr, OsString},
    path::Path,
    process::Stdio,
};

use tokio::process::Command;

/// Variables to set and remove on a single child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverlay {
    pub set: BTreeMap<OsString, OsString>,
    pub remove: Vec<OsString>,
}

impl EnvironmentOverlay {
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.set.get(key.as_ref()).map(OsString::as_os_str)
    }

    pub fn removes(&self, key: impl AsRef<OsStr>) -> bool {
        self.remove.iter().any(|entry| entry == key.as_ref())
    }
}

pub struct InterpreterCommandConfig<'a> {
    pub interpreter: &'a Path,
    pub program: &'a Path,
    pub overlay: &'a EnvironmentOverlay,
}

/// Build the `<interpreter> <program> <args...>` command.
///
/// The child inherits the launcher's stdio and environment; the overlay is
/// applied on top of the inherited environment.
pub fn build_interpreter_command(config: InterpreterCommandConfig<'_>, args: &[OsString]) -> Command {
    let mut command = Command::new(config.interpreter);
    command.kill_on_drop(true);
    command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    for key in &config.overlay.remove {
        command.env_remove(key);
    }
    for (key, value) in &config.overlay.set {
        command.env(key, value);
    }

    command.arg(config.program);
    command.args(args);
    command
}
