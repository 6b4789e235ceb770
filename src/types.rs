// src/types.rs

//! Small policy enums shared by the config layer and the dispatcher.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What to do with a change to a file sitting directly inside a watched root
/// (a path with no section segment, e.g. `manual/notes.md`).
///
/// - `AsSection`: treat the file name itself as the section name. This is
///   what a plain "first path segment" rule produces.
/// - `Skip`: drop the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootLevelPolicy {
    #[default]
    AsSection,
    Skip,
}

impl FromStr for RootLevelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "as_section" => Ok(RootLevelPolicy::AsSection),
            "skip" => Ok(RootLevelPolicy::Skip),
            other => Err(format!(
                "invalid root_level_files: {other} (expected \"as_section\" or \"skip\")"
            )),
        }
    }
}

/// Behaviour when a section fires again while an earlier build of the same
/// section is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Start another build regardless. Builds are not capped.
    #[default]
    Allow,
    /// Skip the firing while a build for that section is in flight.
    SingleFlight,
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(OverlapPolicy::Allow),
            "single_flight" | "single-flight" => Ok(OverlapPolicy::SingleFlight),
            other => Err(format!(
                "invalid overlapping_builds: {other} (expected \"allow\" or \"single_flight\")"
            )),
        }
    }
}

/// Where the quiet window of a burst is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuietWindowMode {
    /// The window starts at the firing event; absorbed events do not move it.
    #[default]
    FromTrigger,
    /// Every absorbed event pushes the end of the window out again, so a
    /// burst only ends after a full window without events.
    FromLastEvent,
}

impl FromStr for QuietWindowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "from_trigger" => Ok(QuietWindowMode::FromTrigger),
            "from_last_event" => Ok(QuietWindowMode::FromLastEvent),
            other => Err(format!(
                "invalid quiet_window_mode: {other} (expected \"from_trigger\" or \"from_last_event\")"
            )),
        }
    }
}

impl fmt::Display for QuietWindowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuietWindowMode::FromTrigger => f.write_str("from_trigger"),
            QuietWindowMode::FromLastEvent => f.write_str("from_last_event"),
        }
    }
}
