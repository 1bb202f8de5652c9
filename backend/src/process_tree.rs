//! Parent/child index over one snapshot.

use crate::types::ProcessRecord;
use std::collections::{HashMap, HashSet};

/// Parent to children mapping built from a single snapshot.
///
/// Every pid of the snapshot sits in exactly one bucket: the children list
/// of its parent when that parent is in the same snapshot, otherwise the
/// orphan list returned by [`ProcessTreeIndex::roots`].
#[derive(Debug, Default, Clone)]
pub struct ProcessTreeIndex {
    children: HashMap<i32, Vec<i32>>,
    parents: HashMap<i32, i32>,
    orphans: Vec<i32>,
}

impl ProcessTreeIndex {
    pub fn build(snapshot: &[ProcessRecord]) -> Self {
        let start_times: HashMap<i32, u64> =
            snapshot.iter().map(|p| (p.pid, p.start_time)).collect();

        let mut index = Self::default();
        for p in snapshot {
            let linked = match start_times.get(&p.ppid) {
                Some(&parent_start) => p.ppid != p.pid && !is_stale_link(parent_start, p.start_time),
                None => false,
            };

            if linked {
                index.children.entry(p.ppid).or_default().push(p.pid);
                index.parents.insert(p.pid, p.ppid);
            } else {
                index.orphans.push(p.pid);
            }
        }
        index
    }

    /// Direct children of `pid`, in snapshot order.
    pub fn children(&self, pid: i32) -> &[i32] {
        self.children.get(&pid).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, pid: i32) -> Option<i32> {
        self.parents.get(&pid).copied()
    }

    /// Processes without a live parent in the snapshot.
    pub fn roots(&self) -> &[i32] {
        &self.orphans
    }

    /// The root followed by all its transitive descendants, depth-first
    /// pre-order. Each pid is emitted at most once even if the links loop.
    pub fn resolve_subtree(&self, root: i32) -> Vec<i32> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(pid) = stack.pop() {
            if !visited.insert(pid) {
                continue;
            }
            out.push(pid);
            // Reversed so the first child is popped first.
            for &child in self.children(pid).iter().rev() {
                if !visited.contains(&child) {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Number of ancestors of `pid` inside the snapshot.
    pub fn depth(&self, pid: i32) -> usize {
        let mut seen = HashSet::from([pid]);
        let mut depth = 0;
        let mut current = pid;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent) {
                break;
            }
            depth += 1;
            current = parent;
        }
        depth
    }
}

// A parent that started after its child is a reused pid, not the real parent.
fn is_stale_link(parent_start: u64, child_start: u64) -> bool {
    parent_start != 0 && child_start != 0 && parent_start > child_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: i32, ppid: i32, start_time: u64) -> ProcessRecord {
        ProcessRecord {
            pid,
            ppid,
            name: format!("p{pid}"),
            path: String::new(),
            memory_bytes: 0,
            state: "S".to_string(),
            start_time,
        }
    }

    // A(1) -> [B(2), C(3)], B(2) -> [D(4)]
    fn sample() -> Vec<ProcessRecord> {
        vec![
            record(1, 0, 10),
            record(2, 1, 20),
            record(3, 1, 30),
            record(4, 2, 40),
        ]
    }

    #[test]
    fn subtree_from_root() {
        let index = ProcessTreeIndex::build(&sample());
        assert_eq!(index.resolve_subtree(1), vec![1, 2, 4, 3]);
    }

    #[test]
    fn subtree_from_inner_node() {
        let index = ProcessTreeIndex::build(&sample());
        assert_eq!(index.resolve_subtree(2), vec![2, 4]);
        assert_eq!(index.resolve_subtree(3), vec![3]);
    }

    #[test]
    fn unknown_root_yields_itself() {
        let index = ProcessTreeIndex::build(&sample());
        assert_eq!(index.resolve_subtree(99), vec![99]);
    }

    #[test]
    fn every_pid_in_exactly_one_bucket() {
        let mut snapshot = sample();
        snapshot.push(record(7, 555, 70)); // parent not in snapshot
        let index = ProcessTreeIndex::build(&snapshot);

        let mut seen: Vec<i32> = index.roots().to_vec();
        for p in &snapshot {
            seen.extend_from_slice(index.children(p.pid));
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4, 7]);
        assert_eq!(index.roots(), &[1, 7]);
    }

    #[test]
    fn cycle_terminates() {
        // Start times unknown, so the links cannot be recognised as stale.
        let snapshot = vec![record(5, 6, 0), record(6, 7, 0), record(7, 5, 0)];
        let index = ProcessTreeIndex::build(&snapshot);

        let mut subtree = index.resolve_subtree(5);
        subtree.sort_unstable();
        assert_eq!(subtree, vec![5, 6, 7]);
        assert!(index.depth(5) <= 2);
    }

    #[test]
    fn self_parent_is_an_orphan() {
        let index = ProcessTreeIndex::build(&[record(8, 8, 1)]);
        assert_eq!(index.roots(), &[8]);
        assert_eq!(index.resolve_subtree(8), vec![8]);
    }

    #[test]
    fn reused_parent_pid_is_not_a_parent() {
        // Pid 20 was reused by a process started after its "child" 21.
        let snapshot = vec![record(20, 1, 500), record(21, 20, 300)];
        let index = ProcessTreeIndex::build(&snapshot);

        assert_eq!(index.children(20), &[] as &[i32]);
        assert_eq!(index.parent(21), None);
        assert_eq!(index.resolve_subtree(20), vec![20]);
    }

    #[test]
    fn depth_counts_ancestors() {
        let index = ProcessTreeIndex::build(&sample());
        assert_eq!(index.depth(1), 0);
        assert_eq!(index.depth(3), 1);
        assert_eq!(index.depth(4), 2);
        assert_eq!(index.depth(99), 0);
    }
}
