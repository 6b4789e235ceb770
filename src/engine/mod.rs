// src/engine/mod.rs

//! Change-to-build dispatch engine.
//!
//! - [`debounce`]: the per-section leading-edge state machine.
//! - [`core`]: the synchronous [`Dispatcher`] that owns one slot per section
//!   and turns [`DispatchEvent`]s into [`DispatchCommand`]s.
//! - [`runtime`]: the async shell that feeds the dispatcher from a channel
//!   and hands builds to a [`crate::exec::BuildRunner`].

use std::fmt;

/// Canonical section name type used throughout the engine.
pub type SectionName = String;

/// Kind of filesystem change carried by a dispatch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Modified,
    Renamed,
    Removed,
    Other,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Removed => "removed",
            ChangeKind::Other => "other",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which subscription produced an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WatchSource {
    /// A section root, by config id (e.g. `"builder"`).
    Root(String),
    /// The fixed site files.
    Site,
}

impl fmt::Display for WatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchSource::Root(id) => write!(f, "root '{id}'"),
            WatchSource::Site => f.write_str("site"),
        }
    }
}

/// One build invocation handed to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Process-wide invocation number, for correlating log lines.
    pub seq: u64,
    pub section: SectionName,
    pub command: String,
    /// The event that opened the burst.
    pub kind: ChangeKind,
    pub path: String,
}

/// Result of one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub seq: u64,
    pub section: SectionName,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub error_detail: Option<String>,
}

impl BuildOutcome {
    pub fn succeeded(request: &BuildRequest) -> Self {
        Self {
            seq: request.seq,
            section: request.section.clone(),
            success: true,
            exit_code: Some(0),
            error_detail: None,
        }
    }

    pub fn failed(request: &BuildRequest, exit_code: Option<i32>, detail: impl Into<String>) -> Self {
        Self {
            seq: request.seq,
            section: request.section.clone(),
            success: false,
            exit_code,
            error_detail: Some(detail.into()),
        }
    }
}

/// Events flowing into the dispatcher from watchers and build tasks.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// A filesystem change. `path` is relative to the source's directory.
    Change {
        source: WatchSource,
        kind: ChangeKind,
        path: String,
    },
    /// A build started by this dispatcher has exited (or failed to start).
    BuildFinished(BuildOutcome),
    /// The OS watcher for `source` reported an error; its events can no
    /// longer be trusted.
    WatchFailed { source: WatchSource, message: String },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod debounce;
pub mod runtime;

pub use self::core::{DispatchCommand, DispatchOptions, DispatchStep, Dispatcher};
pub use debounce::{DebounceDecision, DebounceState};
pub use runtime::Runtime;
