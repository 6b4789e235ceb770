// src/watch/patterns.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::ConfigFile;
use crate::engine::{ChangeKind, DispatchEvent, WatchSource};
use crate::watch::path_utils::relative_str;

/// Compiled ignore globs for one root.
///
/// Patterns are matched against the path relative to the root, with `/`
/// separators (`3-testing/build.js`).
#[derive(Clone)]
pub struct IgnoreSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for IgnoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl IgnoreSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
            builder.add(glob);
        }
        Ok(Self {
            patterns: patterns.to_vec(),
            set: builder.build()?,
        })
    }

    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// One section root: its directory and its own ignore rules.
#[derive(Debug, Clone)]
pub struct RootWatchProfile {
    id: String,
    dir: PathBuf,
    ignore: IgnoreSet,
}

impl RootWatchProfile {
    pub fn new(id: impl Into<String>, dir: impl Into<PathBuf>, ignore: IgnoreSet) -> Self {
        Self {
            id: id.into(),
            dir: dir.into(),
            ignore,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ignore(&self) -> &IgnoreSet {
        &self.ignore
    }

    /// Turn a raw watcher path into a dispatch event, or `None` if the path
    /// is outside this root, is the root itself, or is ignored.
    pub fn route(&self, path: &Path, kind: ChangeKind) -> Option<DispatchEvent> {
        let rel = relative_str(&self.dir, path)?;
        if rel.is_empty() || self.ignore.is_ignored(&rel) {
            return None;
        }
        Some(DispatchEvent::Change {
            source: WatchSource::Root(self.id.clone()),
            kind,
            path: rel,
        })
    }
}

/// The site subscription: a fixed set of files directly under `dir`.
#[derive(Debug, Clone)]
pub struct SiteWatchProfile {
    dir: PathBuf,
    files: BTreeSet<String>,
}

impl SiteWatchProfile {
    pub fn new<I, S>(dir: impl Into<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: dir.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Any change that leaves a listed file in place counts. Editors that
    /// save through a temp file arrive as `Renamed` or `Created` on the
    /// target name; only a removal is dropped.
    pub fn route(&self, path: &Path, kind: ChangeKind) -> Option<DispatchEvent> {
        if kind == ChangeKind::Removed {
            return None;
        }
        let rel = relative_str(&self.dir, path)?;
        if !self.files.contains(&rel) {
            return None;
        }
        Some(DispatchEvent::Change {
            source: WatchSource::Site,
            kind,
            path: rel,
        })
    }
}

/// Every subscription the watch manager sets up.
#[derive(Debug, Clone)]
pub struct WatchProfiles {
    pub roots: Vec<RootWatchProfile>,
    pub site: SiteWatchProfile,
}

/// Compile the watch profiles for a project rooted at `project_root`.
pub fn build_profiles_from_config(project_root: &Path, cfg: &ConfigFile) -> Result<WatchProfiles> {
    let mut roots = Vec::with_capacity(cfg.root.len());
    for (id, root) in cfg.root.iter() {
        let ignore = IgnoreSet::new(&root.ignore)
            .with_context(|| format!("building ignore globset for root {id}"))?;
        roots.push(RootWatchProfile::new(
            id.clone(),
            project_root.join(&root.path),
            ignore,
        ));
    }

    let site = SiteWatchProfile::new(
        project_root.to_path_buf(),
        cfg.site.files.iter().cloned(),
    );

    Ok(WatchProfiles { roots, site })
}
