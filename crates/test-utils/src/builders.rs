use std::path::PathBuf;

use sectionwatch::config::{ConfigFile, RawConfigFile, RootConfig, SectionOverride};
use sectionwatch::engine::{ChangeKind, DispatchEvent, WatchSource};
use sectionwatch::registry::{Section, SectionOrigin, SectionRegistry};
use sectionwatch::types::{OverlapPolicy, QuietWindowMode, RootLevelPolicy};

/// Builder for `ConfigFile`, starting from the built-in defaults.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// Start with no roots at all.
    pub fn without_roots(mut self) -> Self {
        self.config.root.clear();
        self
    }

    pub fn with_root(mut self, id: &str, path: &str, ignore: &[&str]) -> Self {
        self.config.root.insert(
            id.to_string(),
            RootConfig {
                path: PathBuf::from(path),
                ignore: ignore.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn quiet_window_ms(mut self, ms: u64) -> Self {
        self.config.config.quiet_window_ms = ms;
        self
    }

    pub fn quiet_window_mode(mut self, mode: QuietWindowMode) -> Self {
        self.config.config.quiet_window_mode = mode;
        self
    }

    pub fn root_level_files(mut self, policy: RootLevelPolicy) -> Self {
        self.config.config.root_level_files = policy;
        self
    }

    pub fn overlapping_builds(mut self, policy: OverlapPolicy) -> Self {
        self.config.config.overlapping_builds = policy;
        self
    }

    pub fn build_command(mut self, template: &str) -> Self {
        self.config.config.build_command = template.to_string();
        self
    }

    pub fn site_command(mut self, command: &str) -> Self {
        self.config.site.command = command.to_string();
        self
    }

    pub fn section_command(mut self, section: &str, command: &str) -> Self {
        self.config.section.insert(
            section.to_string(),
            SectionOverride {
                command: command.to_string(),
            },
        );
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry with the given root sections (all attributed to `root`) plus a
/// `website` site section. Commands are `build <name>` / `build website`.
pub fn registry_with(root: &str, sections: &[&str]) -> SectionRegistry {
    let site = Section {
        name: "website".to_string(),
        build_command: "build website".to_string(),
        origin: SectionOrigin::Site,
    };
    SectionRegistry::from_sections(
        site,
        sections.iter().map(|name| Section {
            name: name.to_string(),
            build_command: format!("build {name}"),
            origin: SectionOrigin::Root(root.to_string()),
        }),
    )
}

/// A modification event under root `root`.
pub fn root_change(root: &str, path: &str) -> DispatchEvent {
    DispatchEvent::Change {
        source: WatchSource::Root(root.to_string()),
        kind: ChangeKind::Modified,
        path: path.to_string(),
    }
}

/// A site file event of the given kind.
pub fn site_change(file: &str, kind: ChangeKind) -> DispatchEvent {
    DispatchEvent::Change {
        source: WatchSource::Site,
        kind,
        path: file.to_string(),
    }
}
