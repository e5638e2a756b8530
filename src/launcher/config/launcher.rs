use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::lib::{
    errors::ConfigError,
    paths::{is_bare_file_name, is_contained_relative, is_nonempty_absolute},
};

pub const DEFAULT_ENV_SUBPATH: &str = ".venv";
pub const DEFAULT_PROGRAM: &str = "serial_plotter/serial_plotter.py";
pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;
pub const MAX_SHUTDOWN_GRACE_SECS: u64 = 300;

const CURRENT_DIR_KEYWORD: &str = "current_dir";
const EXECUTABLE_DIR_KEYWORD: &str = "executable_dir";

/// How the install (base) directory is located.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BaseDirMode {
    /// The working directory the launcher was started from.
    #[default]
    CurrentDir,
    /// The directory holding the launcher binary.
    ExecutableDir,
    /// A literal absolute path.
    Fixed(PathBuf),
}

impl BaseDirMode {
    /// Parse a keyword (`current_dir`, `executable_dir`) or an absolute path.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        match trimmed {
            "" => Err("Use `current_dir`, `executable_dir`, or an absolute path".into()),
            CURRENT_DIR_KEYWORD => Ok(Self::CurrentDir),
            EXECUTABLE_DIR_KEYWORD => Ok(Self::ExecutableDir),
            other => {
                let path = PathBuf::from(other);
                if is_nonempty_absolute(&path) {
                    Ok(Self::Fixed(path))
                } else {
                    Err(format!(
                        "`{other}` is neither a keyword nor an absolute path"
                    ))
                }
            }
        }
    }
}

impl fmt::Display for BaseDirMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseDirMode::CurrentDir => f.write_str(CURRENT_DIR_KEYWORD),
            BaseDirMode::ExecutableDir => f.write_str(EXECUTABLE_DIR_KEYWORD),
            BaseDirMode::Fixed(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Launcher settings after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSection {
    pub base_dir: BaseDirMode,
    pub env_subpath: PathBuf,
    pub program: PathBuf,
    pub interpreter: String,
    pub shutdown_grace_secs: u64,
}

impl Default for LauncherSection {
    fn default() -> Self {
        Self {
            base_dir: BaseDirMode::default(),
            env_subpath: PathBuf::from(DEFAULT_ENV_SUBPATH),
            program: PathBuf::from(DEFAULT_PROGRAM),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            shutdown_grace_secs: DEFAULT_SHUTDOWN_GRACE_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawLauncherSection {
    pub base_dir: Option<String>,
    pub env_subpath: Option<PathBuf>,
    pub program: Option<PathBuf>,
    pub interpreter: Option<String>,
    pub shutdown_grace_secs: Option<u64>,
}

pub fn parse_launcher_section(
    raw: Option<RawLauncherSection>,
    path: &Path,
) -> Result<LauncherSection, ConfigError> {
    let raw = raw.unwrap_or_default();
    let defaults = LauncherSection::default();

    let base_dir = match raw.base_dir {
        Some(value) => {
            BaseDirMode::parse(&value).map_err(|message| ConfigError::InvalidField {
                path: path.to_path_buf(),
                field: "launcher.base_dir",
                message,
            })?
        }
        None => defaults.base_dir,
    };

    let env_subpath = raw.env_subpath.unwrap_or(defaults.env_subpath);
    validate_relative(path, "launcher.env_subpath", &env_subpath)?;

    let program = raw.program.unwrap_or(defaults.program);
    validate_relative(path, "launcher.program", &program)?;

    let interpreter = raw.interpreter.unwrap_or(defaults.interpreter);
    if !is_bare_file_name(&interpreter) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "launcher.interpreter",
            message: "Use a file name inside the environment's bin directory, e.g. `python3`"
                .into(),
        });
    }

    let shutdown_grace_secs = raw
        .shutdown_grace_secs
        .unwrap_or(defaults.shutdown_grace_secs);
    if shutdown_grace_secs > MAX_SHUTDOWN_GRACE_SECS {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "launcher.shutdown_grace_secs",
            message: format!("Use a value between 0 and {MAX_SHUTDOWN_GRACE_SECS}"),
        });
    }

    Ok(LauncherSection {
        base_dir,
        env_subpath,
        program,
        interpreter,
        shutdown_grace_secs,
    })
}

fn validate_relative(path: &Path, field: &'static str, value: &Path) -> Result<(), ConfigError> {
    if is_contained_relative(value) {
        return Ok(());
    }

    Err(ConfigError::InvalidField {
        path: path.to_path_buf(),
        field,
        message: format!(
            "`{}` must be a relative path inside the base directory",
            value.display()
        ),
    })
}
