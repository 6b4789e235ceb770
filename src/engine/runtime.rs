// src/engine/runtime.rs

use std::fmt;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::core::{DispatchCommand, Dispatcher};
use crate::engine::{BuildOutcome, BuildRequest, DispatchEvent};
use crate::errors::{Result, SectionwatchError};
use crate::exec::BuildRunner;

/// Async shell around [`Dispatcher`].
///
/// Reads [`DispatchEvent`]s from one channel, stamps them with the time of
/// arrival, feeds them to the dispatcher and hands the resulting builds to a
/// [`BuildRunner`]. Builds report back on the same channel, so all
/// dispatcher state is touched from this loop only.
pub struct Runtime<R: BuildRunner> {
    dispatcher: Dispatcher,
    event_rx: mpsc::Receiver<DispatchEvent>,
    runner: R,
}

impl<R: BuildRunner> fmt::Debug for Runtime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl<R: BuildRunner> Runtime<R> {
    pub fn new(dispatcher: Dispatcher, event_rx: mpsc::Receiver<DispatchEvent>, runner: R) -> Self {
        Self {
            dispatcher,
            event_rx,
            runner,
        }
    }

    /// Main event loop.
    ///
    /// Returns `Ok` on shutdown or when every sender is gone, and an error
    /// only when a watcher has been lost.
    pub async fn run(mut self) -> Result<()> {
        info!(sections = self.dispatcher.section_count(), "dispatcher started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "dispatcher received event");

            let step = self.dispatcher.step(event, Instant::now());

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("dispatcher stopping");
                return Ok(());
            }
        }

        info!("event channel closed; dispatcher exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: DispatchCommand) -> Result<()> {
        match command {
            DispatchCommand::RunBuild(request) => {
                self.submit(request).await;
                Ok(())
            }
            DispatchCommand::Abort { reason } => Err(SectionwatchError::WatchLost(reason)),
        }
    }

    /// Hand a build to the runner. A runner that cannot even accept the
    /// request only costs that one build.
    async fn submit(&mut self, request: BuildRequest) {
        let fallback = request.clone();
        if let Err(err) = self.runner.spawn_build(request).await {
            error!(
                section = %fallback.section,
                kind = %fallback.kind,
                seq = fallback.seq,
                error = %err,
                "could not start build"
            );
            let outcome = BuildOutcome::failed(&fallback, None, err.to_string());
            self.dispatcher
                .step(DispatchEvent::BuildFinished(outcome), Instant::now());
        }
    }
}
