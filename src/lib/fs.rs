//! Filesystem probes for virtual environment and install directory layouts.

use std::{
    env, io,
    path::{Path, PathBuf},
};

/// Name of the activation script a virtual environment ships in its bin directory.
const ACTIVATION_SCRIPT: &str = "activate";

/// Directory holding the environment's executables.
pub fn venv_bin_dir(env_root: &Path) -> PathBuf {
    if cfg!(target_os = "windows") {
        env_root.join("Scripts")
    } else {
        env_root.join("bin")
    }
}

/// Path of the activation script inside the environment.
pub fn activation_script(env_root: &Path) -> PathBuf {
    venv_bin_dir(env_root).join(ACTIVATION_SCRIPT)
}

/// Path of a named interpreter inside the environment.
///
/// On Windows the `.exe` suffix is appended when the name carries no extension.
pub fn interpreter_path(env_root: &Path, interpreter: &str) -> PathBuf {
    let path = venv_bin_dir(env_root).join(interpreter);
    if cfg!(target_os = "windows") && path.extension().is_none() {
        path.with_extension("exe")
    } else {
        path
    }
}

/// Returns true if the path exists and is a regular file (symlinks followed).
pub fn is_existing_file(path: &Path) -> bool {
    path.is_file()
}

/// Returns true if the path exists and is a directory (symlinks followed).
pub fn is_existing_dir(path: &Path) -> bool {
    path.is_dir()
}

/// Directory containing the running launcher binary.
pub fn executable_dir() -> io::Result<PathBuf> {
    let exe = env::current_exe()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::other("launcher executable has no parent directory"))
}
