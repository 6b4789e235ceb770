// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::{OverlapPolicy, QuietWindowMode, RootLevelPolicy};

/// Command-line arguments for `sectionwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sectionwatch",
    version,
    about = "Rebuild the section a changed file belongs to, once per burst of changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Project directory containing the section roots and site files.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Path to a TOML config file.
    ///
    /// If omitted, `Sectionwatch.toml` in the project directory is used when
    /// present, otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override `[config].quiet_window_ms`.
    #[arg(long, value_name = "MS")]
    pub quiet_window_ms: Option<u64>,

    /// Override `[config].quiet_window_mode` (from_trigger, from_last_event).
    #[arg(long, value_name = "MODE")]
    pub quiet_window_mode: Option<QuietWindowMode>,

    /// Override `[config].root_level_files` (as_section, skip).
    #[arg(long, value_name = "POLICY")]
    pub root_level_files: Option<RootLevelPolicy>,

    /// Override `[config].overlapping_builds` (allow, single_flight).
    #[arg(long, value_name = "POLICY")]
    pub overlapping_builds: Option<OverlapPolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SECTIONWATCH_LOG` (an env-filter directive) or `info`
    /// is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print roots, ignore rules and sections with their commands, then exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
