use std::{
    fs,
    path::Path,
    process::{Child, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use crate::common::Install;

/// Interpreter that records its pid and then becomes a long-running `sleep`.
fn long_running_interpreter(pid_file: &Path) -> String {
    format!(
        "#!/bin/sh\necho $$ > '{}.tmp'\nmv '{}.tmp' '{}'\nexec sleep 30\n",
        pid_file.display(),
        pid_file.display(),
        pid_file.display()
    )
}

fn wait_for_pid(pid_file: &Path) -> libc::pid_t {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Ok(body) = fs::read_to_string(pid_file) {
            if let Ok(pid) = body.trim().parse() {
                return pid;
            }
        }
        assert!(Instant::now() < deadline, "delegate never started");
        thread::sleep(Duration::from_millis(20));
    }
}

fn wait_with_deadline(launcher: &mut Child) -> ExitStatus {
    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        if let Some(status) = launcher.try_wait().expect("launcher status") {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = launcher.kill();
            panic!("launcher did not exit after cancellation");
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn is_alive(pid: libc::pid_t) -> bool {
    // SAFETY: signal 0 only checks that the pid exists.
    unsafe { libc::kill(pid, 0) == 0 }
}

fn cancel_launcher(signal: libc::c_int) -> (ExitStatus, bool) {
    let install = Install::new();
    let pid_file = install.path().join("delegate.pid");
    install.set_interpreter(&long_running_interpreter(&pid_file));

    let mut launcher = install
        .command(&[])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("launcher should start");
    let delegate = wait_for_pid(&pid_file);

    let launcher_pid = libc::pid_t::try_from(launcher.id()).expect("pid fits");
    // SAFETY: the launcher was spawned by this test and has not been reaped.
    unsafe {
        libc::kill(launcher_pid, signal);
    }

    let status = wait_with_deadline(&mut launcher);
    (status, is_alive(delegate))
}

#[test]
fn sigterm_stops_the_delegate_with_the_launcher() {
    let (status, delegate_alive) = cancel_launcher(libc::SIGTERM);

    assert!(!delegate_alive, "delegate outlived the launcher");
    assert_eq!(status.code(), Some(128 + libc::SIGTERM), "{status:?}");
}

#[test]
fn sighup_stops_the_delegate_with_the_launcher() {
    let (status, delegate_alive) = cancel_launcher(libc::SIGHUP);

    assert!(!delegate_alive, "delegate outlived the launcher");
    assert_eq!(status.code(), Some(128 + libc::SIGHUP), "{status:?}");
}

#[test]
fn sigint_stops_the_delegate_with_the_launcher() {
    let (status, delegate_alive) = cancel_launcher(libc::SIGINT);

    assert!(!delegate_alive, "delegate outlived the launcher");
    // Forwarded when detached; under a foreground terminal the grace period ends in a kill.
    let code = status.code();
    assert!(
        code == Some(128 + libc::SIGINT) || code == Some(128 + libc::SIGKILL),
        "{status:?}"
    );
}
