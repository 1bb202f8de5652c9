//! Suspend/resume capability.
//!
//! The capability is resolved once at startup into a [`SuspendGateway`] and
//! handed to the action engine. When it is unavailable every call fails with
//! [`ProcError::CapabilityUnavailable`] without touching the OS.

use crate::process_kill::send_signal;
use crate::types::ProcError;
use nix::sys::signal::Signal;
use tracing::info;

/// Platform primitive able to pause and continue a process.
pub trait SuspendResume: Send + Sync {
    fn suspend(&self, pid: i32) -> Result<(), ProcError>;
    fn resume(&self, pid: i32) -> Result<(), ProcError>;
}

/// SIGSTOP / SIGCONT.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalSuspender;

impl SuspendResume for SignalSuspender {
    fn suspend(&self, pid: i32) -> Result<(), ProcError> {
        send_signal(pid, Signal::SIGSTOP)
    }

    fn resume(&self, pid: i32) -> Result<(), ProcError> {
        send_signal(pid, Signal::SIGCONT)
    }
}

pub enum SuspendGateway {
    Available(Box<dyn SuspendResume>),
    Unavailable,
}

impl SuspendGateway {
    /// Resolve the platform capability. `enabled = false` forces the
    /// degraded mode.
    pub fn resolve(enabled: bool) -> Self {
        if !enabled {
            info!("suspend/resume disabled by configuration");
            return SuspendGateway::Unavailable;
        }
        if cfg!(unix) {
            info!("suspend/resume available via SIGSTOP/SIGCONT");
            SuspendGateway::Available(Box::new(SignalSuspender))
        } else {
            info!("suspend/resume not supported on this platform");
            SuspendGateway::Unavailable
        }
    }

    pub fn unavailable() -> Self {
        SuspendGateway::Unavailable
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SuspendGateway::Available(_))
    }

    pub fn suspend(&self, pid: i32) -> Result<(), ProcError> {
        match self {
            SuspendGateway::Available(ops) => ops.suspend(pid),
            SuspendGateway::Unavailable => Err(ProcError::CapabilityUnavailable),
        }
    }

    pub fn resume(&self, pid: i32) -> Result<(), ProcError> {
        match self {
            SuspendGateway::Available(ops) => ops.resume(pid),
            SuspendGateway::Unavailable => Err(ProcError::CapabilityUnavailable),
        }
    }
}

impl std::fmt::Debug for SuspendGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuspendGateway::Available(_) => f.write_str("SuspendGateway::Available"),
            SuspendGateway::Unavailable => f.write_str("SuspendGateway::Unavailable"),
        }
    }
}
