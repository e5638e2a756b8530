use std::fs;

use crate::common::{run, Install};

const NOT_FOUND_EXIT: i32 = 127;
const CONFIG_EXIT: i32 = 2;

#[test]
fn missing_environment_fails_without_running_delegate() {
    let install = Install::new();
    fs::remove_file(install.env_root().join("bin/activate")).expect("can remove activate");

    let output = run(&mut install.command(&["--port", "/dev/ttyUSB0"]));

    assert_eq!(output.status.code(), Some(NOT_FOUND_EXIT), "{output:?}");
    assert!(install.recorded_argv().is_none(), "delegate must not run");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Virtual environment not found"), "{stderr}");
}

#[test]
fn missing_environment_directory_fails() {
    let install = Install::new();
    fs::remove_dir_all(install.env_root()).expect("can remove venv");

    let output = run(&mut install.command(&[]));

    assert_eq!(output.status.code(), Some(NOT_FOUND_EXIT), "{output:?}");
    assert!(install.recorded_argv().is_none(), "delegate must not run");
}

#[test]
fn missing_program_fails() {
    let install = Install::new();
    fs::remove_file(install.program()).expect("can remove program");

    let output = run(&mut install.command(&[]));

    assert_eq!(output.status.code(), Some(NOT_FOUND_EXIT), "{output:?}");
    assert!(install.recorded_argv().is_none(), "delegate must not run");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("serial_plotter.py"), "{stderr}");
}

#[test]
fn relative_base_dir_override_is_rejected() {
    let install = Install::new();

    let output = run(install
        .bare_command(&[])
        .env("SERIAL_PLOTTER_BASE_DIR", "relative/install"));

    assert_eq!(output.status.code(), Some(CONFIG_EXIT), "{output:?}");
    assert!(install.recorded_argv().is_none(), "delegate must not run");
}

#[test]
fn explicit_missing_config_is_rejected() {
    let install = Install::new();

    let output = run(install
        .command(&[])
        .env("SERIAL_PLOTTER_LAUNCHER_CONFIG", install.path().join("absent.toml")));

    assert_eq!(output.status.code(), Some(CONFIG_EXIT), "{output:?}");
    assert!(install.recorded_argv().is_none(), "delegate must not run");
}
