//! Application session: the current snapshot, filter, selection and the
//! single in-flight action.

use crate::export::{export_view, ExportFormat};
use eframe::egui;
use procmon::{
    apply_filter, take_snapshot, ActionEngine, ActionKind, ActionRequest, ActionResult,
    ProcError, ProcessRecord, Settings,
};
use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use tracing::{error, info, warn};

type ActionReply = Result<ActionResult, ProcError>;

pub struct Session {
    /// Full, unfiltered snapshot. Replaced wholesale on refresh.
    pub snapshot: Vec<ProcessRecord>,
    pub filter: String,
    pub selection: BTreeSet<i32>,
    pub expand_to_subtree: bool,
    /// One-line message shown in the status bar.
    pub status: String,
    pub last_result: Option<(ActionKind, usize, usize)>,
    engine: Arc<ActionEngine>,
    settings: Settings,
    pending: Option<(ActionKind, Receiver<ActionReply>)>,
}

impl Session {
    pub fn new(settings: Settings, engine: ActionEngine) -> Self {
        Self {
            snapshot: Vec::new(),
            filter: String::new(),
            selection: BTreeSet::new(),
            expand_to_subtree: settings.expand_to_subtree,
            status: "Ready".to_string(),
            last_result: None,
            engine: Arc::new(engine),
            settings,
            pending: None,
        }
    }

    pub fn suspend_available(&self) -> bool {
        self.engine.gateway().is_available()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Processes matching the current filter, in snapshot order.
    pub fn visible(&self) -> Vec<ProcessRecord> {
        apply_filter(&self.snapshot, &self.filter)
    }

    pub fn refresh(&mut self) {
        match take_snapshot() {
            Ok(snapshot) => self.replace_snapshot(snapshot),
            Err(e) => {
                error!(error = %e, "failed to take process snapshot");
                self.status = format!("Refresh failed: {}", e);
            }
        }
    }

    pub fn replace_snapshot(&mut self, snapshot: Vec<ProcessRecord>) {
        let live: BTreeSet<i32> = snapshot.iter().map(|p| p.pid).collect();
        self.selection.retain(|pid| live.contains(pid));
        self.snapshot = snapshot;
    }

    /// Build the request for `targets`, or the message to show instead.
    pub fn request_for(
        &self,
        kind: ActionKind,
        targets: BTreeSet<i32>,
    ) -> Result<ActionRequest, String> {
        if self.is_busy() {
            return Err("An action is already running.".to_string());
        }
        if targets.is_empty() {
            return Err("Select one or more rows first.".to_string());
        }
        Ok(ActionRequest::new(targets, kind).with_subtree(self.expand_to_subtree))
    }

    /// Run `kind` against `targets` on the blocking pool.
    pub fn start_action(&mut self, kind: ActionKind, targets: BTreeSet<i32>, ctx: &egui::Context) {
        let request = match self.request_for(kind, targets) {
            Ok(request) => request,
            Err(message) => {
                self.status = message;
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        let engine = Arc::clone(&self.engine);
        let snapshot = self.snapshot.clone();
        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            let reply = engine.apply(&request, &snapshot);
            let _ = tx.send(reply);
            ctx.request_repaint();
        });

        self.status = format!("Running {}...", kind);
        self.pending = Some((kind, rx));
    }

    /// Pick up a finished action. Returns true when one completed.
    pub fn poll_action(&mut self) -> bool {
        let reply = match &self.pending {
            Some((_, rx)) => match rx.try_recv() {
                Ok(reply) => reply,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => Err(ProcError::Other(
                    "action worker stopped unexpectedly".to_string(),
                )),
            },
            None => return false,
        };

        if let Some((kind, _)) = self.pending.take() {
            self.finish_action(kind, reply);
            self.refresh();
        }
        true
    }

    pub fn finish_action(&mut self, kind: ActionKind, reply: ActionReply) {
        match reply {
            Ok(result) => {
                for (pid, e) in result.failures() {
                    warn!(pid, action = %kind, error = %e, "target failed");
                }
                self.status = format!("{}: {}", kind, result);
                self.last_result = Some((kind, result.succeeded, result.failed));
            }
            Err(e) => {
                error!(action = %kind, error = %e, "action rejected");
                self.status = e.to_string();
            }
        }
    }

    pub fn export(&mut self, format: ExportFormat) {
        let rows = self.visible();
        if rows.is_empty() {
            self.status = "No rows to export.".to_string();
            return;
        }
        let dir = self.settings.resolved_export_dir();
        match export_view(&rows, format, &dir, self.settings.export_bom) {
            Ok(path) => {
                info!(path = %path.display(), rows = rows.len(), "exported process list");
                self.status = format!("Exported {} rows to {}", rows.len(), path.display());
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.status = format!("Export failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procmon::{ProcessControl, SuspendGateway};

    struct NoOs;

    impl ProcessControl for NoOs {
        fn terminate(&self, pid: i32) -> Result<(), ProcError> {
            Err(ProcError::PermissionDenied(pid))
        }

        fn start_time(&self, pid: i32) -> Result<u64, ProcError> {
            Err(ProcError::NotFound(pid))
        }
    }

    fn record(pid: i32, name: &str) -> ProcessRecord {
        ProcessRecord {
            pid,
            ppid: 1,
            name: name.to_string(),
            path: String::new(),
            memory_bytes: 0,
            state: "S".to_string(),
            start_time: 0,
        }
    }

    fn session() -> Session {
        let engine = ActionEngine::new(Box::new(NoOs), SuspendGateway::unavailable());
        let mut session = Session::new(Settings::default(), engine);
        session.replace_snapshot(vec![record(10, "bash"), record(11, "vim"), record(12, "bash")]);
        session
    }

    #[test]
    fn empty_selection_is_rejected() {
        let session = session();
        assert_eq!(
            session.request_for(ActionKind::Terminate, BTreeSet::new()),
            Err("Select one or more rows first.".to_string())
        );
    }

    #[test]
    fn request_carries_tree_flag() {
        let mut session = session();
        session.expand_to_subtree = true;
        let request = session
            .request_for(ActionKind::Suspend, BTreeSet::from([11]))
            .unwrap();
        assert!(request.expand_to_subtree);
        assert_eq!(request.kind, ActionKind::Suspend);
    }

    #[test]
    fn refresh_prunes_selection() {
        let mut session = session();
        session.selection.extend([10, 11]);
        session.replace_snapshot(vec![record(11, "vim")]);
        assert_eq!(session.selection, BTreeSet::from([11]));
    }

    #[test]
    fn visible_applies_filter_to_full_snapshot() {
        let mut session = session();
        session.filter = "BASH".to_string();
        let pids: Vec<i32> = session.visible().iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 12]);
        assert_eq!(session.snapshot.len(), 3);
    }

    #[test]
    fn finished_action_updates_status() {
        let mut session = session();
        let engine = ActionEngine::new(Box::new(NoOs), SuspendGateway::unavailable());
        let reply = engine.apply(
            &ActionRequest::new([10, 11], ActionKind::Suspend),
            &session.snapshot,
        );

        session.finish_action(ActionKind::Suspend, reply);
        assert_eq!(session.status, "suspend: OK=0 FAIL=2");
        assert_eq!(session.last_result, Some((ActionKind::Suspend, 0, 2)));
    }

    #[test]
    fn export_of_empty_view_writes_nothing() {
        let mut session = session();
        session.filter = "no such process".to_string();
        session.export(ExportFormat::Json);
        assert_eq!(session.status, "No rows to export.");
    }
}
