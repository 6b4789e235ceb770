// src/exec/command.rs

//! Child process handling for a single build.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::engine::{BuildOutcome, BuildRequest, DispatchEvent};

/// Start `request` on its own task and report the outcome on `events`.
///
/// The returned handle resolves to the same outcome; dropping it detaches
/// the build.
pub fn spawn_build_task(
    request: BuildRequest,
    workdir: PathBuf,
    events: mpsc::Sender<DispatchEvent>,
) -> JoinHandle<BuildOutcome> {
    tokio::spawn(async move {
        let outcome = run_build(&request, &workdir).await;
        if events
            .send(DispatchEvent::BuildFinished(outcome.clone()))
            .await
            .is_err()
        {
            debug!(
                section = %request.section,
                seq = request.seq,
                "dispatcher gone; build outcome not delivered"
            );
        }
        outcome
    })
}

/// Run one build to completion. Never fails: spawn errors and non-zero exits
/// are logged and folded into the outcome.
pub async fn run_build(request: &BuildRequest, workdir: &Path) -> BuildOutcome {
    match run_build_inner(request, workdir).await {
        Ok(status) if status.success() => {
            info!(
                section = %request.section,
                kind = %request.kind,
                seq = request.seq,
                "build succeeded"
            );
            BuildOutcome::succeeded(request)
        }
        Ok(status) => {
            error!(
                section = %request.section,
                kind = %request.kind,
                seq = request.seq,
                cmd = %request.command,
                exit_code = ?status.code(),
                "build failed"
            );
            BuildOutcome::failed(request, status.code(), format!("build command exited with {status}"))
        }
        Err(err) => {
            let detail = format!("{err:#}");
            error!(
                section = %request.section,
                kind = %request.kind,
                seq = request.seq,
                cmd = %request.command,
                error = %detail,
                "build could not be run"
            );
            BuildOutcome::failed(request, None, detail)
        }
    }
}

async fn run_build_inner(request: &BuildRequest, workdir: &Path) -> Result<ExitStatus> {
    debug!(
        section = %request.section,
        seq = request.seq,
        cmd = %request.command,
        "starting build process"
    );

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&request.command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&request.command);
        c
    };

    cmd.current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning build for section '{}'", request.section))?;

    if let Some(stdout) = child.stdout.take() {
        drain_lines(stdout, request.section.clone(), request.seq, "stdout");
    }
    if let Some(stderr) = child.stderr.take() {
        drain_lines(stderr, request.section.clone(), request.seq, "stderr");
    }

    child
        .wait()
        .await
        .with_context(|| format!("waiting for build of section '{}'", request.section))
}

/// Forward a child stream to the log so its pipe never fills up.
fn drain_lines<S>(stream: S, section: String, seq: u64, label: &'static str)
where
    S: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(section = %section, seq, stream = label, "{}", line);
        }
    });
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::engine::ChangeKind;

    fn request(command: &str) -> BuildRequest {
        BuildRequest {
            seq: 7,
            section: "3-testing".to_string(),
            command: command.to_string(),
            kind: ChangeKind::Modified,
            path: "3-testing/App.svelte".to_string(),
        }
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run_build(&request("true"), dir.path()).await;
        assert!(outcome.success);
        assert_eq!(outcome.seq, 7);
        assert_eq!(outcome.error_detail, None);
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run_build(&request("echo oops >&2; exit 3"), dir.path()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.section, "3-testing");
        assert_eq!(outcome.exit_code, Some(3));
        assert!(outcome.error_detail.is_some());
    }

    #[tokio::test]
    async fn missing_workdir_is_a_failed_outcome() {
        let outcome = run_build(&request("true"), Path::new("/no/such/dir/anywhere")).await;
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, None);
    }

    #[tokio::test]
    async fn runs_in_workdir_and_reports_on_channel() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel(4);

        let handle = spawn_build_task(
            request("touch built.marker"),
            dir.path().to_path_buf(),
            tx,
        );
        let outcome = handle.await.unwrap();
        assert!(outcome.success);
        assert!(dir.path().join("built.marker").exists());

        match rx.recv().await {
            Some(DispatchEvent::BuildFinished(reported)) => assert_eq!(reported, outcome),
            other => panic!("expected BuildFinished, got {other:?}"),
        }
    }
}
