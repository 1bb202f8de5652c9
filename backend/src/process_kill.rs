//! Process termination and identity primitives.

use crate::types::ProcError;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use procfs::process::Process;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// OS primitives the action engine needs besides suspend/resume.
pub trait ProcessControl: Send + Sync {
    fn terminate(&self, pid: i32) -> Result<(), ProcError>;

    /// Current start time of `pid`, used to detect pid reuse.
    fn start_time(&self, pid: i32) -> Result<u64, ProcError>;
}

/// Signal-based [`ProcessControl`].
///
/// Terminate sends SIGTERM, waits up to `grace` for the process to go away,
/// then sends SIGKILL. A zero grace period sends SIGKILL straight away.
#[derive(Debug, Clone)]
pub struct SignalControl {
    grace: Duration,
}

impl SignalControl {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }
}

impl Default for SignalControl {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl ProcessControl for SignalControl {
    fn terminate(&self, pid: i32) -> Result<(), ProcError> {
        if self.grace.is_zero() {
            return send_signal(pid, Signal::SIGKILL);
        }

        send_signal(pid, Signal::SIGTERM)?;

        let deadline = Instant::now() + self.grace;
        while Instant::now() < deadline {
            if !is_alive(pid) {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }

        if !is_alive(pid) {
            return Ok(());
        }

        match send_signal(pid, Signal::SIGKILL) {
            // Exited between the last check and SIGKILL.
            Err(ProcError::NotFound(_)) => Ok(()),
            other => other,
        }
    }

    fn start_time(&self, pid: i32) -> Result<u64, ProcError> {
        let stat = Process::new(pid)
            .and_then(|p| p.stat())
            .map_err(|e| match e {
                procfs::ProcError::NotFound(_) => ProcError::NotFound(pid),
                procfs::ProcError::PermissionDenied(_) => ProcError::PermissionDenied(pid),
                other => ProcError::from(other),
            })?;
        Ok(stat.starttime)
    }
}

/// Send `signal` to `pid`, mapping errno to [`ProcError`].
///
/// Non-positive pids address process groups in kill(2) and are refused.
pub(crate) fn send_signal(pid: i32, signal: Signal) -> Result<(), ProcError> {
    if pid <= 0 {
        return Err(ProcError::InvalidRequest(format!(
            "refusing to signal pid {pid}"
        )));
    }
    signal::kill(Pid::from_raw(pid), signal).map_err(|e| signal_error(pid, e))
}

fn signal_error(pid: i32, errno: Errno) -> ProcError {
    match errno {
        Errno::EPERM => ProcError::PermissionDenied(pid),
        Errno::ESRCH => ProcError::NotFound(pid),
        other => ProcError::SignalError(pid, other.to_string()),
    }
}

// Zombies and vanished pids count as gone. Any other probe error means
// the process may still be running.
fn is_alive(pid: i32) -> bool {
    match Process::new(pid).and_then(|p| p.stat()) {
        Ok(stat) => !matches!(stat.state, 'Z' | 'X'),
        Err(_) => probe_alive(signal::kill(Pid::from_raw(pid), None)),
    }
}

fn probe_alive(probe: nix::Result<()>) -> bool {
    !matches!(probe, Err(Errno::ESRCH))
}
