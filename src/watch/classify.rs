// src/watch/classify.rs

//! Map a changed path inside a root to the section it belongs to.
//!
//! The section is the first segment of the path relative to the root:
//! `3-testing/src/App.svelte` belongs to `3-testing`. The root id plays no
//! part in the answer; every root lays out sections the same way.

use crate::engine::SectionName;
use crate::types::RootLevelPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The path lies inside a section directory.
    Nested(SectionName),
    /// The path has a single segment: the change is at the root itself.
    RootLevel(SectionName),
    /// Nothing but separators (the root directory).
    Empty,
}

impl Classification {
    /// Section name to trigger, if any, under `policy`.
    pub fn resolve(self, policy: RootLevelPolicy) -> Option<SectionName> {
        match (self, policy) {
            (Classification::Nested(name), _) => Some(name),
            (Classification::RootLevel(name), RootLevelPolicy::AsSection) => Some(name),
            (Classification::RootLevel(_), RootLevelPolicy::Skip) => None,
            (Classification::Empty, _) => None,
        }
    }
}

/// Classify `rel_path` (relative to its watch root).
///
/// Leading separators are skipped and `\` counts as a separator.
pub fn classify(rel_path: &str) -> Classification {
    let trimmed = rel_path.trim_start_matches(['/', '\\']);
    if trimmed.is_empty() {
        return Classification::Empty;
    }

    match trimmed.find(['/', '\\']) {
        Some(idx) => Classification::Nested(trimmed[..idx].to_string()),
        None => Classification::RootLevel(trimmed.to_string()),
    }
}
