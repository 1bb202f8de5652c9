//! Batch action engine: scope expansion, dedup, children-first ordering,
//! and per-target execution with aggregated results.

use crate::process_kill::ProcessControl;
use crate::process_tree::ProcessTreeIndex;
use crate::suspend::SuspendGateway;
use crate::types::{ActionKind, ActionRequest, ActionResult, ProcError, ProcessRecord};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

pub struct ActionEngine {
    control: Box<dyn ProcessControl>,
    gateway: SuspendGateway,
    verify_identity: bool,
}

impl ActionEngine {
    pub fn new(control: Box<dyn ProcessControl>, gateway: SuspendGateway) -> Self {
        Self {
            control,
            gateway,
            verify_identity: true,
        }
    }

    /// Check the victim's start time against the snapshot before acting.
    pub fn verify_identity(mut self, enabled: bool) -> Self {
        self.verify_identity = enabled;
        self
    }

    pub fn gateway(&self) -> &SuspendGateway {
        &self.gateway
    }

    /// Victims of `request` in execution order, without touching the OS.
    ///
    /// The tree is always built from `snapshot`, which should be the full
    /// unfiltered snapshot so subtrees are never cut short.
    pub fn plan(
        &self,
        request: &ActionRequest,
        snapshot: &[ProcessRecord],
    ) -> Result<Vec<i32>, ProcError> {
        if request.targets.is_empty() {
            return Err(ProcError::InvalidRequest(
                "no target processes selected".to_string(),
            ));
        }

        let index = ProcessTreeIndex::build(snapshot);

        let victims: BTreeSet<i32> = if request.expand_to_subtree {
            request
                .targets
                .iter()
                .flat_map(|&pid| index.resolve_subtree(pid))
                .collect()
        } else {
            request.targets.clone()
        };

        // Deepest first so children go before their parents.
        let mut ordered: Vec<i32> = victims.into_iter().collect();
        ordered.sort_by_key(|&pid| Reverse((index.depth(pid), pid)));
        Ok(ordered)
    }

    /// Apply `request` to every victim. One victim's failure never stops
    /// the others, and nothing is retried.
    pub fn apply(
        &self,
        request: &ActionRequest,
        snapshot: &[ProcessRecord],
    ) -> Result<ActionResult, ProcError> {
        let victims = self.plan(request, snapshot)?;
        info!(
            action = %request.kind,
            targets = request.targets.len(),
            victims = victims.len(),
            subtree = request.expand_to_subtree,
            "applying action"
        );

        let start_times: HashMap<i32, u64> =
            snapshot.iter().map(|p| (p.pid, p.start_time)).collect();

        let mut result = ActionResult::default();
        for pid in victims {
            let outcome = self
                .check_identity(pid, start_times.get(&pid).copied())
                .and_then(|()| self.invoke(request.kind, pid));

            match &outcome {
                Ok(()) => debug!(pid, action = %request.kind, "action succeeded"),
                Err(e) => warn!(pid, action = %request.kind, error = %e, "action failed"),
            }
            result.record(pid, outcome);
        }

        info!(
            action = %request.kind,
            succeeded = result.succeeded,
            failed = result.failed,
            "action finished"
        );
        Ok(result)
    }

    fn check_identity(&self, pid: i32, expected: Option<u64>) -> Result<(), ProcError> {
        let expected = match expected {
            Some(t) if self.verify_identity && t != 0 => t,
            _ => return Ok(()),
        };
        let current = self.control.start_time(pid)?;
        if current != expected {
            return Err(ProcError::StalePid(pid));
        }
        Ok(())
    }

    fn invoke(&self, kind: ActionKind, pid: i32) -> Result<(), ProcError> {
        match kind {
            ActionKind::Terminate => self.control.terminate(pid),
            ActionKind::Suspend => self.gateway.suspend(pid),
            ActionKind::Resume => self.gateway.resume(pid),
        }
    }
}
