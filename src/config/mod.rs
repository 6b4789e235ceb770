// src/config/mod.rs

//! Configuration loading and validation for sectionwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Locate and load a config file, or fall back to built-in defaults
//!   (`loader.rs`).
//! - Validate the raw model into a [`ConfigFile`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve_config, DEFAULT_CONFIG_FILE};
pub use model::{
    ConfigFile, ConfigSection, RawConfigFile, RootConfig, SectionOverride, SiteConfig,
};
