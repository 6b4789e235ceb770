// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod registry;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::{resolve_config, ConfigFile};
use crate::engine::{DispatchEvent, DispatchOptions, Dispatcher, Runtime};
use crate::errors::SectionwatchError;
use crate::exec::ShellBuildRunner;
use crate::fs::RealFileSystem;
use crate::registry::{SectionOrigin, SectionRegistry};
use crate::watch::{build_profiles_from_config, spawn_watchers, WatchProfiles};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project root + config resolution
/// - the section registry (fatal if a root is missing)
/// - file watchers, one per source
/// - the dispatcher runtime and the shell build runner
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let project_root = resolve_project_root(&args.root)?;
    let mut cfg = resolve_config(&project_root, args.config.as_deref())?;
    apply_cli_overrides(&mut cfg, &args)?;

    let profiles = build_profiles_from_config(&project_root, &cfg)?;
    let registry = SectionRegistry::scan(&cfg, &profiles, &RealFileSystem)?;

    if args.dry_run {
        print_dry_run(&project_root, &cfg, &profiles, &registry);
        return Ok(());
    }

    let (tx, rx) = mpsc::channel::<DispatchEvent>(256);

    let _watchers = spawn_watchers(profiles, tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(DispatchEvent::ShutdownRequested).await;
        });
    }

    let runner = ShellBuildRunner::new(project_root.clone(), tx);
    let dispatcher = Dispatcher::new(registry, DispatchOptions::from_config(&cfg.config));
    info!(
        root = ?project_root,
        quiet_window_ms = cfg.config.quiet_window_ms,
        mode = %cfg.config.quiet_window_mode,
        "sectionwatch ready"
    );

    Runtime::new(dispatcher, rx, runner).run().await?;
    Ok(())
}

/// Canonical project directory; a missing one is as fatal as a missing
/// section root.
fn resolve_project_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize().map_err(|_| {
        SectionwatchError::MissingRoot {
            id: "project".to_string(),
            path: root.to_path_buf(),
        }
        .into()
    })
}

/// Apply CLI flags on top of the loaded config.
fn apply_cli_overrides(cfg: &mut ConfigFile, args: &CliArgs) -> Result<()> {
    if let Some(ms) = args.quiet_window_ms {
        if ms == 0 {
            return Err(
                SectionwatchError::ConfigError("--quiet-window-ms must be >= 1".to_string()).into(),
            );
        }
        cfg.config.quiet_window_ms = ms;
    }
    if let Some(mode) = args.quiet_window_mode {
        cfg.config.quiet_window_mode = mode;
    }
    if let Some(policy) = args.root_level_files {
        cfg.config.root_level_files = policy;
    }
    if let Some(policy) = args.overlapping_builds {
        cfg.config.overlapping_builds = policy;
    }
    Ok(())
}

fn print_dry_run(
    project_root: &Path,
    cfg: &ConfigFile,
    profiles: &WatchProfiles,
    registry: &SectionRegistry,
) {
    println!("sectionwatch dry-run");
    println!("  project: {}", project_root.display());
    println!("  config.quiet_window_ms = {}", cfg.config.quiet_window_ms);
    println!("  config.quiet_window_mode = {}", cfg.config.quiet_window_mode);
    println!("  config.root_level_files = {:?}", cfg.config.root_level_files);
    println!("  config.overlapping_builds = {:?}", cfg.config.overlapping_builds);
    println!();

    println!("roots ({}):", profiles.roots.len());
    for root in profiles.roots.iter() {
        println!("  - {} ({})", root.id(), root.dir().display());
        println!("      ignore: {:?}", root.ignore().patterns());
    }
    let files: Vec<&str> = profiles.site.files().collect();
    println!("  - site ({}) files: {:?}", profiles.site.dir().display(), files);
    println!();

    println!("sections ({}):", registry.len());
    for section in registry.sections() {
        let origin = match &section.origin {
            SectionOrigin::Root(id) => id.as_str(),
            SectionOrigin::Site => "site",
        };
        println!("  - {} [{}]", section.name, origin);
        println!("      cmd: {}", section.build_command);
    }
}
