use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use tempfile::{tempdir, TempDir};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_serial-plotter-launcher");
pub const PROGRAM_RELATIVE: &str = "serial_plotter/serial_plotter.py";

/// Stand-in interpreter: records argv and selected variables, then exits
/// with `FAKE_EXIT_CODE`.
const FAKE_PYTHON: &str = r#"#!/bin/sh
: > "$FAKE_RECORD"
for arg in "$@"; do
  printf '%s\n' "$arg" >> "$FAKE_RECORD"
done
printf 'VIRTUAL_ENV=%s\n' "$VIRTUAL_ENV" > "$FAKE_RECORD.env"
printf 'PYTHONHOME=%s\n' "${PYTHONHOME-<unset>}" >> "$FAKE_RECORD.env"
exit "${FAKE_EXIT_CODE:-0}"
"#;

/// A temporary install directory laid out like a deployed plotter.
pub struct Install {
    _dir: TempDir,
    root: PathBuf,
}

impl Install {
    pub fn new() -> Self {
        Self::with_env_subpath(".venv")
    }

    pub fn with_env_subpath(subpath: &str) -> Self {
        let dir = tempdir().expect("can create temporary install directory");
        let root = dir.path().to_path_buf();
        Self::lay_out(dir, root, subpath)
    }

    /// Install placed in `<tmp>/<name>` rather than directly in the temp dir.
    pub fn named(name: &str) -> Self {
        let dir = tempdir().expect("can create temporary install directory");
        let root = dir.path().join(name);
        Self::lay_out(dir, root, ".venv")
    }

    fn lay_out(dir: TempDir, root: PathBuf, subpath: &str) -> Self {
        let bin = root.join(subpath).join("bin");
        fs::create_dir_all(&bin).expect("can create venv bin dir");
        fs::write(bin.join("activate"), "# venv activate\n").expect("can write activate");
        write_executable(&bin.join("python"), FAKE_PYTHON);

        let program = root.join(PROGRAM_RELATIVE);
        fs::create_dir_all(program.parent().expect("program has parent"))
            .expect("can create program dir");
        fs::write(&program, "#!/usr/bin/env python3\n").expect("can write program");
        Self { _dir: dir, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Replace the stand-in interpreter with a custom script.
    pub fn set_interpreter(&self, body: &str) {
        write_executable(&self.env_root().join("bin/python"), body);
    }

    pub fn program(&self) -> PathBuf {
        self.path().join(PROGRAM_RELATIVE)
    }

    pub fn env_root(&self) -> PathBuf {
        self.path().join(".venv")
    }

    fn record_path(&self) -> PathBuf {
        self.path().join("invocation.txt")
    }

    /// Launcher command pointed at this install via `SERIAL_PLOTTER_BASE_DIR`.
    pub fn command(&self, args: &[&str]) -> Command {
        let mut command = self.bare_command(args);
        command.env("SERIAL_PLOTTER_BASE_DIR", self.path());
        command
    }

    /// Launcher command relying on the working directory and config file only.
    pub fn bare_command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(BINARY_PATH);
        command
            .args(args)
            .current_dir(self.path())
            .env_remove("SERIAL_PLOTTER_BASE_DIR")
            .env_remove("SERIAL_PLOTTER_LAUNCHER_CONFIG")
            .env_remove("SERIAL_PLOTTER_DRY_RUN")
            .env("PYTHONHOME", "/should/not/leak")
            .env("RUST_LOG", "warn")
            .env("FAKE_RECORD", self.record_path());
        command
    }

    /// Lines the fake interpreter received as argv, or `None` if it never ran.
    pub fn recorded_argv(&self) -> Option<Vec<String>> {
        let body = fs::read_to_string(self.record_path()).ok()?;
        Some(body.lines().map(str::to_string).collect())
    }

    pub fn recorded_env(&self) -> Option<Vec<String>> {
        let mut path = self.record_path().into_os_string();
        path.push(".env");
        let body = fs::read_to_string(PathBuf::from(path)).ok()?;
        Some(body.lines().map(str::to_string).collect())
    }
}

pub fn run(command: &mut Command) -> Output {
    command.output().expect("launcher should start")
}

fn write_executable(path: &Path, body: &str) {
    fs::write(path, body).expect("can write script");
    let mut perms = fs::metadata(path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("can chmod script");
}
