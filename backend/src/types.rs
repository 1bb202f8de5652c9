//! Data types and error definitions for process management.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// One live process as seen by a single snapshot.
///
/// Records are immutable once built and superseded by the next snapshot.
/// A `pid` only identifies the same process within one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: i32,
    pub ppid: i32,
    pub name: String,
    /// Full executable path, empty when it could not be read.
    pub path: String,
    /// Resident set size in bytes, 0 when it could not be read.
    pub memory_bytes: u64,
    pub state: String,
    /// Start time in clock ticks since boot, 0 when unknown.
    pub start_time: u64,
}

/// Lifecycle action applied to a batch of processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Terminate,
    Suspend,
    Resume,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::Terminate => "terminate",
            ActionKind::Suspend => "suspend",
            ActionKind::Resume => "resume",
        };
        f.write_str(label)
    }
}

/// A single batch action invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub targets: BTreeSet<i32>,
    pub kind: ActionKind,
    pub expand_to_subtree: bool,
}

impl ActionRequest {
    pub fn new(targets: impl IntoIterator<Item = i32>, kind: ActionKind) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            kind,
            expand_to_subtree: false,
        }
    }

    pub fn with_subtree(mut self, expand: bool) -> Self {
        self.expand_to_subtree = expand;
        self
    }
}

/// Outcome of the action against one victim.
#[derive(Debug)]
pub struct TargetOutcome {
    pub pid: i32,
    pub result: Result<(), ProcError>,
}

/// Aggregate outcome of an [`ActionRequest`].
#[derive(Debug, Default)]
pub struct ActionResult {
    pub succeeded: usize,
    pub failed: usize,
    /// Per-victim outcomes in execution order.
    pub outcomes: Vec<TargetOutcome>,
}

impl ActionResult {
    pub(crate) fn record(&mut self, pid: i32, result: Result<(), ProcError>) {
        if result.is_ok() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(TargetOutcome { pid, result });
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = (i32, &ProcError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.pid, e)))
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OK={} FAIL={}", self.succeeded, self.failed)
    }
}

/// Errors that can occur during process management.
#[derive(Error, Debug)]
pub enum ProcError {
    #[error("Permission denied for PID {0}")]
    PermissionDenied(i32),
    #[error("Process {0} not found")]
    NotFound(i32),
    #[error("Failed to send signal to PID {0}: {1}")]
    SignalError(i32, String),
    #[error("PID {0} now belongs to a different process")]
    StalePid(i32),
    #[error("Suspend/resume is not available on this system")]
    CapabilityUnavailable,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Procfs error: {0}")]
    ProcfsError(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Other error: {0}")]
    Other(String),
}

impl From<procfs::ProcError> for ProcError {
    fn from(err: procfs::ProcError) -> Self {
        ProcError::ProcfsError(err.to_string())
    }
}

impl From<serde_json::Error> for ProcError {
    fn from(err: serde_json::Error) -> Self {
        ProcError::Export(err.to_string())
    }
}

impl From<csv::Error> for ProcError {
    fn from(err: csv::Error) -> Self {
        ProcError::Export(err.to_string())
    }
}
