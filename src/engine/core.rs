// src/engine/core.rs

//! Pure dispatcher state machine.
//!
//! [`Dispatcher::step`] consumes one [`DispatchEvent`] plus the time it was
//! observed and returns the commands the async shell should carry out. It
//! owns the section table (one debounce state and in-flight counter per
//! section) and does no IO, so it can be driven from tests with synthetic
//! timestamps.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::ConfigSection;
use crate::engine::debounce::{DebounceDecision, DebounceState};
use crate::engine::{BuildOutcome, BuildRequest, ChangeKind, DispatchEvent, SectionName, WatchSource};
use crate::registry::{Section, SectionRegistry};
use crate::types::{OverlapPolicy, QuietWindowMode, RootLevelPolicy};
use crate::watch::classify::{classify, Classification};

/// Dispatcher tunables, normally taken from `[config]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    pub quiet_window: Duration,
    pub quiet_window_mode: QuietWindowMode,
    pub root_level_files: RootLevelPolicy,
    pub overlapping_builds: OverlapPolicy,
}

impl DispatchOptions {
    pub fn from_config(cfg: &ConfigSection) -> Self {
        Self {
            quiet_window: cfg.quiet_window(),
            quiet_window_mode: cfg.quiet_window_mode,
            root_level_files: cfg.root_level_files,
            overlapping_builds: cfg.overlapping_builds,
        }
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::from_config(&ConfigSection::default())
    }
}

/// Command produced by the dispatcher for the IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchCommand {
    /// Start this build without waiting for it.
    RunBuild(BuildRequest),
    /// Stop the process with an error.
    Abort { reason: String },
}

/// Result of handling a single event.
#[derive(Debug, Clone)]
pub struct DispatchStep {
    pub commands: Vec<DispatchCommand>,
    pub keep_running: bool,
}

impl DispatchStep {
    fn continue_with(commands: Vec<DispatchCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn stop(commands: Vec<DispatchCommand>) -> Self {
        Self {
            commands,
            keep_running: false,
        }
    }
}

#[derive(Debug)]
struct SectionSlot {
    section: Section,
    debounce: DebounceState,
    in_flight: usize,
}

#[derive(Debug)]
pub struct Dispatcher {
    slots: BTreeMap<SectionName, SectionSlot>,
    site_section: SectionName,
    options: DispatchOptions,
    next_seq: u64,
}

impl Dispatcher {
    pub fn new(registry: SectionRegistry, options: DispatchOptions) -> Self {
        let site_section = registry.site_section().to_string();
        let slots = registry
            .into_sections()
            .map(|section| {
                (
                    section.name.clone(),
                    SectionSlot {
                        section,
                        debounce: DebounceState::Idle,
                        in_flight: 0,
                    },
                )
            })
            .collect();

        Self {
            slots,
            site_section,
            options,
            next_seq: 0,
        }
    }

    pub fn section_count(&self) -> usize {
        self.slots.len()
    }

    /// Raw debounce state of `section`. An expired cooldown is only folded
    /// back to `Idle` by the next event.
    pub fn debounce_state(&self, section: &str) -> Option<DebounceState> {
        self.slots.get(section).map(|slot| slot.debounce)
    }

    /// Number of builds of `section` started and not yet reported finished.
    pub fn in_flight(&self, section: &str) -> usize {
        self.slots.get(section).map_or(0, |slot| slot.in_flight)
    }

    /// Handle one event observed at `now`.
    pub fn step(&mut self, event: DispatchEvent, now: Instant) -> DispatchStep {
        match event {
            DispatchEvent::Change { source, kind, path } => {
                let commands = self
                    .handle_change(&source, kind, &path, now)
                    .map(DispatchCommand::RunBuild)
                    .into_iter()
                    .collect();
                DispatchStep::continue_with(commands)
            }
            DispatchEvent::BuildFinished(outcome) => {
                self.handle_build_finished(outcome);
                DispatchStep::continue_with(Vec::new())
            }
            DispatchEvent::WatchFailed { source, message } => {
                error!(
                    source = %source,
                    error = %message,
                    "file watcher failed; rebuilds for this source would be silently lost"
                );
                DispatchStep::stop(vec![DispatchCommand::Abort {
                    reason: format!("{source}: {message}"),
                }])
            }
            DispatchEvent::ShutdownRequested => {
                info!("shutdown requested");
                DispatchStep::stop(Vec::new())
            }
        }
    }

    fn handle_change(
        &mut self,
        source: &WatchSource,
        kind: ChangeKind,
        path: &str,
        now: Instant,
    ) -> Option<BuildRequest> {
        let section = self.resolve_section(source, kind, path)?;
        self.trigger(section, source, kind, path, now)
    }

    fn resolve_section(
        &self,
        source: &WatchSource,
        kind: ChangeKind,
        path: &str,
    ) -> Option<SectionName> {
        match source {
            WatchSource::Site => {
                if kind == ChangeKind::Removed {
                    debug!(kind = %kind, path, "site file removed; nothing to build");
                    return None;
                }
                Some(self.site_section.clone())
            }
            WatchSource::Root(root) => {
                let classification = classify(path);
                match &classification {
                    Classification::RootLevel(name) => warn!(
                        root = %root,
                        path,
                        section = %name,
                        policy = ?self.options.root_level_files,
                        "change at root level has no section segment"
                    ),
                    Classification::Empty => debug!(root = %root, "change on the root itself"),
                    Classification::Nested(_) => {}
                }
                classification.resolve(self.options.root_level_files)
            }
        }
    }

    fn trigger(
        &mut self,
        section: SectionName,
        source: &WatchSource,
        kind: ChangeKind,
        path: &str,
        now: Instant,
    ) -> Option<BuildRequest> {
        let options = self.options;

        let Some(slot) = self.slots.get_mut(&section) else {
            warn!(
                section = %section,
                source = %source,
                path,
                "change maps to an unknown section; sections are fixed at startup"
            );
            return None;
        };

        match slot
            .debounce
            .on_event(now, options.quiet_window, options.quiet_window_mode)
        {
            DebounceDecision::Absorbed => {
                debug!(section = %section, kind = %kind, path, "absorbed into current burst");
                None
            }
            DebounceDecision::Fire => {
                if options.overlapping_builds == OverlapPolicy::SingleFlight && slot.in_flight > 0 {
                    info!(
                        section = %section,
                        kind = %kind,
                        path,
                        in_flight = slot.in_flight,
                        "build still running; skipping (single_flight)"
                    );
                    return None;
                }

                self.next_seq += 1;
                slot.in_flight += 1;

                let request = BuildRequest {
                    seq: self.next_seq,
                    section,
                    command: slot.section.build_command.clone(),
                    kind,
                    path: path.to_string(),
                };
                info!(
                    section = %request.section,
                    kind = %kind,
                    path,
                    seq = request.seq,
                    "building section"
                );
                Some(request)
            }
        }
    }

    fn handle_build_finished(&mut self, outcome: BuildOutcome) {
        let Some(slot) = self.slots.get_mut(&outcome.section) else {
            debug!(section = %outcome.section, "completion for unknown section");
            return;
        };
        slot.in_flight = slot.in_flight.saturating_sub(1);
        debug!(
            section = %outcome.section,
            seq = outcome.seq,
            success = outcome.success,
            in_flight = slot.in_flight,
            "build completion recorded"
        );
    }
}
