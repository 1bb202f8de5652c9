//! UI-agnostic process management library for Linux.
//!
//! Takes process snapshots, indexes them into a parent/child tree, filters
//! them by text, and applies terminate/suspend/resume to a selection,
//! optionally expanded to each selection's descendants.
//! Uses `procfs` for enumeration and `nix` for signals.

mod action;
mod config;
mod export;
mod filter;
mod process_kill;
mod process_list;
mod process_tree;
mod suspend;
mod types;

pub use action::ActionEngine;
pub use config::{Settings, CONFIG_ENV};
pub use export::{to_csv, to_json, write_utf8};
pub use filter::{apply_filter, matches};
pub use process_kill::{ProcessControl, SignalControl};
pub use process_list::{
    snapshot_from, take_snapshot, ProcessEntry, ProcessSource, ProcfsSource, IDLE_PID,
};
pub use process_tree::ProcessTreeIndex;
pub use suspend::{SignalSuspender, SuspendGateway, SuspendResume};
pub use types::{
    ActionKind, ActionRequest, ActionResult, ProcError, ProcessRecord, TargetOutcome,
};
