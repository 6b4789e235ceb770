// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SectionwatchError};

/// File looked up in the project root when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "Sectionwatch.toml";

/// Load a configuration file from a given path and return the raw model.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a checked [`ConfigFile`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        SectionwatchError::ConfigError(format!("reading config file {:?}: {e}", path))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}

/// Pick the configuration for a project.
///
/// - An explicit path must exist and be valid.
/// - Otherwise `<project_root>/Sectionwatch.toml` is used if present.
/// - Otherwise the built-in defaults apply.
pub fn resolve_config(project_root: &Path, explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        info!(config = ?path, "loading config");
        return load_and_validate(path);
    }

    let candidate = project_root.join(DEFAULT_CONFIG_FILE);
    if candidate.is_file() {
        info!(config = ?candidate, "loading config");
        return load_and_validate(&candidate);
    }

    info!("no {DEFAULT_CONFIG_FILE} found; using built-in defaults");
    Ok(ConfigFile::default())
}
