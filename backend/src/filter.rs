//! Case-insensitive substring filtering over a snapshot.

use crate::types::ProcessRecord;

/// Keep the records whose name or path contains `query`, ignoring case.
/// An empty query keeps everything. Relative order is preserved.
pub fn apply_filter(processes: &[ProcessRecord], query: &str) -> Vec<ProcessRecord> {
    if query.is_empty() {
        return processes.to_vec();
    }

    let query_lower = query.to_lowercase();
    processes
        .iter()
        .filter(|p| matches(p, &query_lower))
        .cloned()
        .collect()
}

/// `query_lower` must already be lowercased.
pub fn matches(process: &ProcessRecord, query_lower: &str) -> bool {
    process.name.to_lowercase().contains(query_lower)
        || process.path.to_lowercase().contains(query_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: i32, name: &str, path: &str) -> ProcessRecord {
        ProcessRecord {
            pid,
            ppid: 1,
            name: name.to_string(),
            path: path.to_string(),
            memory_bytes: 0,
            state: "S".to_string(),
            start_time: 0,
        }
    }

    fn snapshot() -> Vec<ProcessRecord> {
        vec![
            record(10, "Firefox", "/usr/lib/firefox/firefox"),
            record(11, "bash", "/usr/bin/bash"),
            record(12, "kworker/0:1", ""),
            record(13, "Web Content", "/usr/lib/firefox/firefox"),
            record(14, "ÜBERSETZER", "/opt/tools/übersetzer"),
        ]
    }

    fn pids(records: &[ProcessRecord]) -> Vec<i32> {
        records.iter().map(|r| r.pid).collect()
    }

    #[test]
    fn empty_query_returns_input() {
        let all = snapshot();
        assert_eq!(apply_filter(&all, ""), all);
    }

    #[test]
    fn matches_name_ignoring_case() {
        assert_eq!(pids(&apply_filter(&snapshot(), "BASH")), vec![11]);
    }

    #[test]
    fn matches_path_and_keeps_order() {
        assert_eq!(pids(&apply_filter(&snapshot(), "lib/FIRE")), vec![10, 13]);
    }

    #[test]
    fn folds_non_ascii() {
        assert_eq!(pids(&apply_filter(&snapshot(), "übersetz")), vec![14]);
    }

    #[test]
    fn pid_is_not_searched() {
        assert!(apply_filter(&snapshot(), "12").is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let once = apply_filter(&snapshot(), "fire");
        assert_eq!(apply_filter(&once, "fire"), once);
    }
}
