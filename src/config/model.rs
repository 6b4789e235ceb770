// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{OverlapPolicy, QuietWindowMode, RootLevelPolicy};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// quiet_window_ms = 500
/// build_command = "npm run build:{number}"
///
/// [root.manual]
/// path = "manual"
/// ignore = [".*", "**/.*", "**/*.js"]
///
/// [site]
/// files = ["README.md", "build.js"]
/// command = "npm run build:website"
/// ```
///
/// Every table is optional. Leaving out `[root.*]` entirely keeps the
/// built-in `manual` + `builder` roots.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Watched roots keyed by id (`[root.<id>]`).
    #[serde(default = "default_roots")]
    pub root: BTreeMap<String, RootConfig>,

    #[serde(default)]
    pub site: SiteConfig,

    /// Per-section command overrides (`[section.<name>]`).
    #[serde(default)]
    pub section: BTreeMap<String, SectionOverride>,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            config: ConfigSection::default(),
            root: default_roots(),
            site: SiteConfig::default(),
            section: BTreeMap::new(),
        }
    }
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`)
/// or [`Default`], so holders can rely on the checks having run.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub root: BTreeMap<String, RootConfig>,
    pub site: SiteConfig,
    pub section: BTreeMap<String, SectionOverride>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            root: raw.root,
            site: raw.site,
            section: raw.section,
        }
    }

    /// Command configured for `section` in `[section.<name>]`, if any.
    pub fn command_override(&self, section: &str) -> Option<&str> {
        self.section.get(section).map(|s| s.command.as_str())
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[config]` section: dispatcher behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Length of the quiet window in milliseconds.
    #[serde(default = "default_quiet_window_ms")]
    pub quiet_window_ms: u64,

    #[serde(default)]
    pub quiet_window_mode: QuietWindowMode,

    #[serde(default)]
    pub root_level_files: RootLevelPolicy,

    #[serde(default)]
    pub overlapping_builds: OverlapPolicy,

    /// Command template for root sections. `{name}` expands to the section
    /// name, `{number}` to its leading token (`3-testing` -> `3`).
    #[serde(default = "default_build_command")]
    pub build_command: String,
}

impl ConfigSection {
    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.quiet_window_ms)
    }
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            quiet_window_ms: default_quiet_window_ms(),
            quiet_window_mode: QuietWindowMode::default(),
            root_level_files: RootLevelPolicy::default(),
            overlapping_builds: OverlapPolicy::default(),
            build_command: default_build_command(),
        }
    }
}

/// `[root.<id>]`: one watched directory and the paths under it that must
/// never trigger a build.
#[derive(Debug, Clone, Deserialize)]
pub struct RootConfig {
    /// Directory, relative to the project root.
    pub path: PathBuf,

    /// Glob patterns matched against paths relative to `path`.
    #[serde(default = "default_dotfile_ignores")]
    pub ignore: Vec<String>,
}

/// `[site]`: the single top-level section fed by a fixed set of files.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,

    /// File names directly under the project root.
    #[serde(default = "default_site_files")]
    pub files: Vec<String>,

    #[serde(default = "default_site_command")]
    pub command: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            files: default_site_files(),
            command: default_site_command(),
        }
    }
}

/// `[section.<name>]`
#[derive(Debug, Clone, Deserialize)]
pub struct SectionOverride {
    pub command: String,
}

fn default_quiet_window_ms() -> u64 {
    500
}

fn default_build_command() -> String {
    "npm run build:{number}".to_string()
}

fn default_dotfile_ignores() -> Vec<String> {
    vec![".*".to_string(), "**/.*".to_string()]
}

fn default_site_name() -> String {
    "website".to_string()
}

fn default_site_files() -> Vec<String> {
    vec!["README.md".to_string(), "build.js".to_string()]
}

fn default_site_command() -> String {
    "npm run build:website".to_string()
}

/// The two stock roots.
///
/// `manual` sections are hand-written, so their scripts are not build
/// inputs. `builder` sections write `build.js` / `*.build.js` into their own
/// directory, which must not retrigger the build that produced them.
fn default_roots() -> BTreeMap<String, RootConfig> {
    let mut roots = BTreeMap::new();

    let mut manual_ignore = default_dotfile_ignores();
    manual_ignore.push("**/*.js".to_string());
    roots.insert(
        "manual".to_string(),
        RootConfig {
            path: PathBuf::from("manual"),
            ignore: manual_ignore,
        },
    );

    let mut builder_ignore = default_dotfile_ignores();
    builder_ignore.push("**/build.js".to_string());
    builder_ignore.push("**/*.build.js".to_string());
    roots.insert(
        "builder".to_string(),
        RootConfig {
            path: PathBuf::from("builder"),
            ignore: builder_ignore,
        },
    );

    roots
}
