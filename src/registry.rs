// src/registry.rs

//! Section registry.
//!
//! Sections are enumerated once at startup: every immediate child of every
//! watched root, plus the synthetic site section. The set never changes
//! afterwards; a directory created later is not a section until restart.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::engine::SectionName;
use crate::errors::{Result, SectionwatchError};
use crate::fs::FileSystem;
use crate::watch::patterns::WatchProfiles;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(name|number)\}").expect("placeholder regex is valid"));

static LEADING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^-]+").expect("leading token regex is valid"));

/// Where a section was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOrigin {
    Root(String),
    Site,
}

/// A named unit of buildable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: SectionName,
    pub build_command: String,
    pub origin: SectionOrigin,
}

#[derive(Debug, Clone)]
pub struct SectionRegistry {
    sections: BTreeMap<SectionName, Section>,
    site_section: SectionName,
}

impl SectionRegistry {
    /// Build a registry from already-resolved sections.
    pub fn from_sections(site: Section, sections: impl IntoIterator<Item = Section>) -> Self {
        let site_section = site.name.clone();
        let mut map: BTreeMap<SectionName, Section> = sections
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();
        map.insert(site_section.clone(), site);
        Self {
            sections: map,
            site_section,
        }
    }

    /// Enumerate sections from the roots in `profiles`.
    ///
    /// A root that is missing or not a directory is fatal. Entries matched
    /// by a root's ignore set (dot-files and the like) are skipped.
    pub fn scan(cfg: &ConfigFile, profiles: &WatchProfiles, fs: &dyn FileSystem) -> Result<Self> {
        let mut sections: BTreeMap<SectionName, Section> = BTreeMap::new();

        for root in profiles.roots.iter() {
            if !fs.is_dir(root.dir()) {
                return Err(SectionwatchError::MissingRoot {
                    id: root.id().to_string(),
                    path: root.dir().to_path_buf(),
                });
            }

            let entries = fs
                .read_dir(root.dir())
                .map_err(|e| e.context(format!("listing sections of root '{}'", root.id())))?;

            let mut names: Vec<String> = entries
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            names.sort();

            for name in names {
                if root.ignore().is_ignored(&name) {
                    debug!(root = %root.id(), entry = %name, "ignored entry is not a section");
                    continue;
                }
                if name == cfg.site.name {
                    return Err(SectionwatchError::ConfigError(format!(
                        "section '{name}' under root '{}' has the same name as the site section",
                        root.id()
                    )));
                }
                if let Some(existing) = sections.get(&name) {
                    warn!(
                        section = %name,
                        first = ?existing.origin,
                        root = %root.id(),
                        "section exists under more than one root; they share one trigger"
                    );
                    continue;
                }

                let build_command = resolve_build_command(cfg, &name);
                debug!(root = %root.id(), section = %name, cmd = %build_command, "registered section");
                sections.insert(
                    name.clone(),
                    Section {
                        name,
                        build_command,
                        origin: SectionOrigin::Root(root.id().to_string()),
                    },
                );
            }
        }

        let site = Section {
            name: cfg.site.name.clone(),
            build_command: cfg.site.command.clone(),
            origin: SectionOrigin::Site,
        };

        let registry = Self::from_sections(site, sections.into_values());
        info!(count = registry.len(), "section registry built");
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn site_section(&self) -> &str {
        &self.site_section
    }

    /// Sections in name order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn into_sections(self) -> impl Iterator<Item = Section> {
        self.sections.into_values()
    }
}

/// Build command for a root section: the `[section.<name>]` override if
/// present, else the `[config].build_command` template.
pub fn resolve_build_command(cfg: &ConfigFile, section: &str) -> String {
    match cfg.command_override(section) {
        Some(cmd) => cmd.to_string(),
        None => expand_command_template(&cfg.config.build_command, section),
    }
}

/// Expand `{name}` and `{number}` in `template`.
pub fn expand_command_template(template: &str, section: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "name" => section.to_string(),
            _ => section_number(section).to_string(),
        })
        .into_owned()
}

/// Leading token of a section name: the first run of characters that are
/// not `-`. `3-testing` -> `3`, `intro` -> `intro`.
pub fn section_number(section: &str) -> &str {
    LEADING_TOKEN
        .find(section)
        .map(|m| m.as_str())
        .unwrap_or(section)
}
