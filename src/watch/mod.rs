// src/watch/mod.rs

//! File watching and change routing.
//!
//! This module is responsible for:
//! - Compiling each root's ignore globs and the site file list (`patterns`).
//! - Mapping a root-relative path to its section (`classify`).
//! - Wiring one `notify` subscription per source and forwarding routed
//!   changes to the dispatcher (`watcher`).
//!
//! It does not debounce or run anything; it only turns filesystem changes
//! into [`crate::engine::DispatchEvent`]s.

pub mod classify;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use classify::{classify, Classification};
pub use patterns::{
    build_profiles_from_config, IgnoreSet, RootWatchProfile, SiteWatchProfile, WatchProfiles,
};
pub use watcher::{change_kind, spawn_watchers, WatcherHandle};
