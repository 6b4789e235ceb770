// src/errors.rs

//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SectionwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("watch root '{id}' is missing or not a directory: {path:?}")]
    MissingRoot { id: String, path: PathBuf },

    #[error("failed to watch {source_name}: {error}")]
    Watch {
        source_name: String,
        #[source]
        error: notify::Error,
    },

    #[error("file watch lost: {0}")]
    WatchLost(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SectionwatchError>;
