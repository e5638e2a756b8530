//! Run the delegated program and carry its exit status back.

use std::{process::ExitStatus, time::Duration};

use tokio::process::Child;
#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{info, warn};

use crate::{
    launcher::plan::LaunchPlan,
    lib::{
        errors::{exit_codes, LaunchError},
        interpreter::{build_interpreter_command, InterpreterCommandConfig},
        telemetry::LaunchSpan,
    },
};

/// How the delegated program ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateOutcome {
    /// Exited normally with this code.
    Exited(i32),
    /// Terminated by this signal (unix).
    Signaled(i32),
    /// The launcher was interrupted and no status could be collected.
    Interrupted,
}

impl DelegateOutcome {
    /// Shell-style status: the exit code, or 128 + signal.
    pub fn exit_code(&self) -> i32 {
        match self {
            DelegateOutcome::Exited(code) => *code,
            DelegateOutcome::Signaled(signal) => exit_codes::SIGNAL_BASE + signal,
            DelegateOutcome::Interrupted => i32::from(exit_codes::INTERRUPTED),
        }
    }

    /// `Ok` on status 0, `DelegateFailed` otherwise.
    pub fn into_result(self) -> Result<(), LaunchError> {
        match self.exit_code() {
            0 => Ok(()),
            exit_code => Err(LaunchError::DelegateFailed { exit_code }),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DelegateOutcome::Exited(0) => "succeeded",
            DelegateOutcome::Exited(_) => "failed",
            DelegateOutcome::Signaled(_) => "signaled",
            DelegateOutcome::Interrupted => "interrupted",
        }
    }
}

impl From<ExitStatus> for DelegateOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return DelegateOutcome::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return DelegateOutcome::Signaled(signal);
            }
        }
        DelegateOutcome::Exited(1)
    }
}

/// Signal that asked the launcher to stop while the delegate was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    /// Ctrl-C.
    Interrupt,
    /// `SIGTERM`, as sent by `kill`, container runtimes and service managers.
    Terminate,
    /// `SIGHUP`: the controlling terminal went away.
    Hangup,
}

impl Cancellation {
    #[cfg(unix)]
    fn signal_number(self) -> libc::c_int {
        match self {
            Cancellation::Interrupt => libc::SIGINT,
            Cancellation::Terminate => libc::SIGTERM,
            Cancellation::Hangup => libc::SIGHUP,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Cancellation::Interrupt => "interrupt",
            Cancellation::Terminate => "terminate",
            Cancellation::Hangup => "hangup",
        }
    }
}

/// Cancellation signal handlers, registered before the child is spawned so
/// that none of them can take the launcher down by default disposition.
#[cfg(unix)]
struct CancelListener {
    interrupt: Option<Signal>,
    terminate: Option<Signal>,
    hangup: Option<Signal>,
}

#[cfg(unix)]
impl CancelListener {
    fn install() -> Self {
        Self {
            interrupt: listen(SignalKind::interrupt(), Cancellation::Interrupt),
            terminate: listen(SignalKind::terminate(), Cancellation::Terminate),
            hangup: listen(SignalKind::hangup(), Cancellation::Hangup),
        }
    }

    async fn recv(&mut self) -> Cancellation {
        tokio::select! {
            Some(()) = next_signal(&mut self.interrupt) => Cancellation::Interrupt,
            Some(()) = next_signal(&mut self.terminate) => Cancellation::Terminate,
            Some(()) = next_signal(&mut self.hangup) => Cancellation::Hangup,
            else => std::future::pending().await,
        }
    }
}

#[cfg(unix)]
fn listen(kind: SignalKind, cancellation: Cancellation) -> Option<Signal> {
    match signal(kind) {
        Ok(stream) => Some(stream),
        Err(err) => {
            warn!(
                target: "serial_plotter_launcher::delegate",
                signal = cancellation.label(),
                reason = %err,
                "Signal handler unavailable; the delegated program may outlive the launcher"
            );
            None
        }
    }
}

#[cfg(unix)]
async fn next_signal(stream: &mut Option<Signal>) -> Option<()> {
    match stream {
        Some(stream) => stream.recv().await,
        None => None,
    }
}

#[cfg(not(unix))]
struct CancelListener;

#[cfg(not(unix))]
impl CancelListener {
    fn install() -> Self {
        Self
    }

    async fn recv(&mut self) -> Cancellation {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Cancellation::Interrupt,
            Err(err) => {
                warn!(
                    target: "serial_plotter_launcher::delegate",
                    reason = %err,
                    "Ctrl-C handler unavailable; waiting for delegated program"
                );
                std::future::pending().await
            }
        }
    }
}

/// Spawn `<interpreter> <program> <args...>` and wait for it.
///
/// Ctrl-C, `SIGTERM` and `SIGHUP` are not fatal to the launcher while the
/// child runs: the signal is passed on, the child gets `shutdown_grace` to
/// exit on its own and is killed afterwards.
pub async fn run_delegate(plan: &LaunchPlan) -> Result<DelegateOutcome, LaunchError> {
    let mut command = build_interpreter_command(
        InterpreterCommandConfig {
            interpreter: plan.environment.interpreter(),
            program: &plan.program,
            overlay: plan.environment.overlay(),
        },
        &plan.args,
    );

    let mut listener = CancelListener::install();
    let span = LaunchSpan::start(&plan.program, plan.args.len());
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(source) => {
            span.finish("spawn_failed", None);
            return Err(LaunchError::SpawnFailed {
                interpreter: plan.environment.interpreter().to_path_buf(),
                source,
            });
        }
    };

    let outcome = wait_or_cancel(&mut child, &mut listener, plan.shutdown_grace).await;
    match &outcome {
        Ok(outcome) => span.finish(outcome.label(), Some(outcome.exit_code())),
        Err(_) => span.finish("wait_failed", None),
    }
    outcome
}

async fn wait_or_cancel(
    child: &mut Child,
    listener: &mut CancelListener,
    grace: Duration,
) -> Result<DelegateOutcome, LaunchError> {
    tokio::select! {
        status = child.wait() => {
            status
                .map(DelegateOutcome::from)
                .map_err(|source| LaunchError::Wait { source })
        }
        cancellation = listener.recv() => cancel_child(child, cancellation, grace).await,
    }
}

/// Pass a cancellation on to the child, then escalate to a kill after `grace`.
pub async fn cancel_child(
    child: &mut Child,
    cancellation: Cancellation,
    grace: Duration,
) -> Result<DelegateOutcome, LaunchError> {
    forward_cancellation(child, cancellation);

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => status
            .map(DelegateOutcome::from)
            .map_err(|source| LaunchError::Wait { source }),
        Err(_) => {
            warn!(
                target: "serial_plotter_launcher::delegate",
                signal = cancellation.label(),
                grace_secs = grace.as_secs(),
                "Delegated program ignored the cancellation; killing it"
            );
            if let Err(err) = child.start_kill() {
                warn!(
                    target: "serial_plotter_launcher::delegate",
                    reason = %err,
                    "Failed to kill delegated program"
                );
            }
            Ok(child
                .wait()
                .await
                .map(DelegateOutcome::from)
                .unwrap_or(DelegateOutcome::Interrupted))
        }
    }
}

#[cfg(unix)]
fn forward_cancellation(child: &Child, cancellation: Cancellation) {
    // A terminal Ctrl-C already reached every process in the foreground group.
    if cancellation == Cancellation::Interrupt && shares_foreground_group() {
        info!(
            target: "serial_plotter_launcher::delegate",
            "Interrupt delivered by the terminal; waiting for delegated program"
        );
        return;
    }
    let Some(pid) = child.id() else {
        return;
    };
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return;
    };
    info!(
        target: "serial_plotter_launcher::delegate",
        pid,
        signal = cancellation.label(),
        "Forwarding signal to delegated program"
    );
    // SAFETY: plain syscall on a pid we spawned and have not yet reaped.
    unsafe {
        libc::kill(pid, cancellation.signal_number());
    }
}

#[cfg(not(unix))]
fn forward_cancellation(_child: &Child, _cancellation: Cancellation) {}

#[cfg(unix)]
fn shares_foreground_group() -> bool {
    // SAFETY: only reads process state.
    let own = unsafe { libc::getpgrp() };
    foreground_group().is_some_and(|group| group == own)
}

/// Foreground process group of the controlling terminal.
///
/// Any standard stream may be redirected, so each is tried before falling
/// back to `/dev/tty`.
#[cfg(unix)]
fn foreground_group() -> Option<libc::pid_t> {
    use std::os::fd::AsRawFd;

    let standard = [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO];
    if let Some(group) = first_foreground_group(&standard) {
        return Some(group);
    }
    let tty = std::fs::File::open("/dev/tty").ok()?;
    first_foreground_group(&[tty.as_raw_fd()])
}

#[cfg(unix)]
fn first_foreground_group(fds: &[libc::c_int]) -> Option<libc::pid_t> {
    fds.iter().find_map(|&fd| {
        // SAFETY: `tcgetpgrp` only queries the descriptor and fails cleanly on non-terminals.
        let group = unsafe { libc::tcgetpgrp(fd) };
        (group != -1).then_some(group)
    })
}
