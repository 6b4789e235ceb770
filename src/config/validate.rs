// src/config/validate.rs

use std::collections::BTreeMap;
use std::path::{Component, Path};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SectionwatchError};
use crate::watch::patterns::IgnoreSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SectionwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_roots(cfg)?;
    validate_site(cfg)?;
    validate_overrides(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> SectionwatchError {
    SectionwatchError::ConfigError(msg.into())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.quiet_window_ms == 0 {
        return Err(config_error("[config].quiet_window_ms must be >= 1 (got 0)"));
    }
    if cfg.config.build_command.trim().is_empty() {
        return Err(config_error("[config].build_command must not be empty"));
    }
    Ok(())
}

fn validate_roots(cfg: &RawConfigFile) -> Result<()> {
    if cfg.root.is_empty() {
        return Err(config_error(
            "config must contain at least one [root.<id>] section",
        ));
    }

    // Two ids on one directory would classify every event twice.
    let mut seen: BTreeMap<&Path, &str> = BTreeMap::new();

    for (id, root) in cfg.root.iter() {
        if root.path.as_os_str().is_empty() {
            return Err(config_error(format!("root '{id}' has an empty `path`")));
        }
        if root.path.is_absolute()
            || root
                .path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(config_error(format!(
                "root '{id}' path {:?} must be relative to the project root and stay inside it",
                root.path
            )));
        }
        if let Some(other) = seen.insert(root.path.as_path(), id.as_str()) {
            return Err(config_error(format!(
                "roots '{other}' and '{id}' both watch {:?}",
                root.path
            )));
        }

        IgnoreSet::new(&root.ignore).map_err(|e| {
            config_error(format!("root '{id}' has an invalid `ignore` list: {e:#}"))
        })?;
    }
    Ok(())
}

fn validate_site(cfg: &RawConfigFile) -> Result<()> {
    let site = &cfg.site;
    if site.name.trim().is_empty() || site.name.contains(['/', '\\']) {
        return Err(config_error(format!(
            "[site].name must be a plain, non-empty name (got {:?})",
            site.name
        )));
    }
    if site.files.is_empty() {
        return Err(config_error("[site].files must list at least one file"));
    }
    for file in site.files.iter() {
        if file.trim().is_empty() || file.contains(['/', '\\']) {
            return Err(config_error(format!(
                "[site].files entry {file:?} must be a file name directly under the project root"
            )));
        }
    }
    if site.command.trim().is_empty() {
        return Err(config_error("[site].command must not be empty"));
    }
    Ok(())
}

fn validate_overrides(cfg: &RawConfigFile) -> Result<()> {
    for (name, section) in cfg.section.iter() {
        if section.command.trim().is_empty() {
            return Err(config_error(format!(
                "[section.{name}].command must not be empty"
            )));
        }
    }
    Ok(())
}
