// src/engine/debounce.rs

//! Leading-edge debounce for a single section.
//!
//! ```text
//! Idle              --event-->              Fire, Cooldown(now + window)
//! Cooldown(until)   --event, now < until--> Absorbed
//! Cooldown(until)   --now >= until-->       Idle
//! ```
//!
//! The timeout edge is taken lazily when the next event arrives, so there is
//! never more than one deadline per section and nothing to cancel.

use std::time::{Duration, Instant};

use crate::types::QuietWindowMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebounceState {
    #[default]
    Idle,
    Cooldown {
        until: Instant,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    /// First event of a burst: run the build now.
    Fire,
    /// Inside the quiet window of an earlier firing.
    Absorbed,
}

impl DebounceState {
    /// Feed one event arriving at `now`.
    pub fn on_event(
        &mut self,
        now: Instant,
        window: Duration,
        mode: QuietWindowMode,
    ) -> DebounceDecision {
        match *self {
            DebounceState::Cooldown { until } if now < until => {
                if mode == QuietWindowMode::FromLastEvent {
                    *self = DebounceState::Cooldown { until: now + window };
                }
                DebounceDecision::Absorbed
            }
            _ => {
                *self = DebounceState::Cooldown { until: now + window };
                DebounceDecision::Fire
            }
        }
    }
}
