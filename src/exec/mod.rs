// src/exec/mod.rs

//! Build execution layer.
//!
//! - [`backend`]: the [`BuildRunner`] trait the runtime submits builds to,
//!   and [`ShellBuildRunner`], the production implementation.
//! - [`command`]: runs one build command as a child process and reports its
//!   [`crate::engine::BuildOutcome`].

pub mod backend;
pub mod command;

pub use backend::{BuildRunner, ShellBuildRunner};
pub use command::{run_build, spawn_build_task};
