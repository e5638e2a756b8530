use crate::common::{run, Install};

fn expected_argv(install: &Install, args: &[&str]) -> Vec<String> {
    std::iter::once(install.program().display().to_string())
        .chain(args.iter().map(|arg| arg.to_string()))
        .collect()
}

#[test]
fn serial_port_arguments_reach_the_plotter_unchanged() {
    let install = Install::new();
    let args = ["--port", "/dev/ttyUSB0", "--baud", "115200"];

    let output = run(&mut install.command(&args));

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert_eq!(install.recorded_argv(), Some(expected_argv(&install, &args)));
}

#[test]
fn empty_invocation_forwards_no_arguments() {
    let install = Install::new();

    let output = run(&mut install.command(&[]));

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert_eq!(install.recorded_argv(), Some(expected_argv(&install, &[])));
}

#[test]
fn launcher_never_claims_help_version_or_escape() {
    let install = Install::new();
    let args = ["--help", "--version", "--", "-k", "ax", "ay", "-n", "two words"];

    let output = run(&mut install.command(&args));

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert_eq!(install.recorded_argv(), Some(expected_argv(&install, &args)));
}

#[test]
fn delegate_exit_code_becomes_launcher_exit_code() {
    for code in [1, 3, 42, 255] {
        let install = Install::new();

        let output = run(install
            .command(&["-p", "/dev/ttyACM0"])
            .env("FAKE_EXIT_CODE", code.to_string()));

        assert_eq!(output.status.code(), Some(code), "{output:?}");
        assert!(install.recorded_argv().is_some(), "delegate should have run");
    }
}

#[test]
fn delegate_runs_inside_activated_environment() {
    let install = Install::new();

    let output = run(&mut install.command(&["-o"]));

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    assert_eq!(
        install.recorded_env(),
        Some(vec![
            format!("VIRTUAL_ENV={}", install.env_root().display()),
            "PYTHONHOME=<unset>".to_string(),
        ])
    );
}

#[test]
fn failing_delegate_is_not_reported_twice() {
    let install = Install::new();

    let output = run(install.command(&[]).env("FAKE_EXIT_CODE", "9"));

    assert_eq!(output.status.code(), Some(9));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("exited with status"),
        "launcher should stay quiet about delegate failures: {stderr}"
    );
}
