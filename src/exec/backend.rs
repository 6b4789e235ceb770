// src/exec/backend.rs

//! Pluggable build runner.
//!
//! The runtime talks to a `BuildRunner` rather than spawning processes
//! itself, so tests can substitute a runner that records requests and
//! reports scripted outcomes.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::engine::{BuildRequest, DispatchEvent};
use crate::errors::Result;

use super::command::spawn_build_task;

pub trait BuildRunner: Send {
    /// Submit a build. Must return as soon as the build is under way; the
    /// outcome is reported later as `DispatchEvent::BuildFinished`.
    fn spawn_build(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs build commands through the platform shell, one tokio task per
/// build, with `workdir` as the working directory.
#[derive(Debug, Clone)]
pub struct ShellBuildRunner {
    workdir: PathBuf,
    events: mpsc::Sender<DispatchEvent>,
}

impl ShellBuildRunner {
    pub fn new(workdir: impl Into<PathBuf>, events: mpsc::Sender<DispatchEvent>) -> Self {
        Self {
            workdir: workdir.into(),
            events,
        }
    }
}

impl BuildRunner for ShellBuildRunner {
    fn spawn_build(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            // Detached: the handle is only useful to callers that want the
            // outcome directly, which the runtime does not.
            let _handle = spawn_build_task(request, self.workdir.clone(), self.events.clone());
            Ok(())
        })
    }
}
