//! Process listing: enumerate every visible process, then enrich each one
//! with its executable path and resident memory.

use crate::types::{ProcError, ProcessRecord};
use procfs::process::Process;
use tracing::debug;

/// PID of the idle/system pseudo-process. Listed, never enriched.
pub const IDLE_PID: i32 = 0;

/// What the enumeration primitive reports for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: i32,
    pub ppid: i32,
    pub name: String,
    pub state: String,
    pub start_time: u64,
}

/// OS access used to build a snapshot.
///
/// Enumeration failure aborts the snapshot; the per-pid queries are
/// best-effort and only blank out the field they feed.
pub trait ProcessSource {
    fn enumerate(&self) -> Result<Vec<ProcessEntry>, ProcError>;
    fn exe_path(&self, pid: i32) -> Result<String, ProcError>;
    fn resident_memory(&self, pid: i32) -> Result<u64, ProcError>;
}

/// [`ProcessSource`] backed by `/proc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcfsSource;

impl ProcessSource for ProcfsSource {
    fn enumerate(&self) -> Result<Vec<ProcessEntry>, ProcError> {
        let all_procs = procfs::process::all_processes()
            .map_err(|e| ProcError::Other(format!("Failed to read /proc: {}", e)))?;

        let mut entries = Vec::new();
        for proc_result in all_procs {
            let proc = match proc_result {
                Ok(proc) => proc,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable /proc entry");
                    continue;
                }
            };
            // The process may exit between listing and reading its stat.
            match proc.stat() {
                Ok(stat) => entries.push(ProcessEntry {
                    pid: stat.pid,
                    ppid: stat.ppid,
                    name: stat.comm,
                    state: stat.state.to_string(),
                    start_time: stat.starttime,
                }),
                Err(e) => debug!(pid = proc.pid, error = %e, "process vanished during listing"),
            }
        }
        Ok(entries)
    }

    fn exe_path(&self, pid: i32) -> Result<String, ProcError> {
        let exe = Process::new(pid)?.exe()?;
        Ok(exe.to_string_lossy().into_owned())
    }

    fn resident_memory(&self, pid: i32) -> Result<u64, ProcError> {
        let statm = Process::new(pid)?.statm()?;
        Ok(statm.resident * procfs::page_size())
    }
}

/// Take a snapshot of all live processes from `/proc`.
pub fn take_snapshot() -> Result<Vec<ProcessRecord>, ProcError> {
    snapshot_from(&ProcfsSource)
}

/// Take a snapshot from an arbitrary source.
///
/// Every enumerated process yields exactly one record, whatever happens
/// while enriching it. Order follows the source.
pub fn snapshot_from<S: ProcessSource + ?Sized>(
    source: &S,
) -> Result<Vec<ProcessRecord>, ProcError> {
    let entries = source.enumerate()?;
    let mut records = Vec::with_capacity(entries.len());

    for entry in entries {
        let mut record = ProcessRecord {
            pid: entry.pid,
            ppid: entry.ppid,
            name: entry.name,
            path: String::new(),
            memory_bytes: 0,
            state: entry.state,
            start_time: entry.start_time,
        };

        if record.pid != IDLE_PID {
            match source.exe_path(record.pid) {
                Ok(path) => record.path = path,
                Err(e) => debug!(pid = record.pid, error = %e, "executable path unavailable"),
            }
            match source.resident_memory(record.pid) {
                Ok(bytes) => record.memory_bytes = bytes,
                Err(e) => debug!(pid = record.pid, error = %e, "resident memory unavailable"),
            }
        }

        records.push(record);
    }

    debug!(count = records.len(), "snapshot taken");
    Ok(records)
}
