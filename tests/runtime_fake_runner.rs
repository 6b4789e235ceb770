// tests/runtime_fake_runner.rs

mod common;
use crate::common::builders::{registry_with, root_change, site_change};
use crate::common::fake_runner::{built_sections, FakeBuildRunner};
use crate::common::{init_tracing, with_timeout};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use sectionwatch::engine::{
    ChangeKind, DispatchEvent, DispatchOptions, Dispatcher, Runtime, WatchSource,
};
use sectionwatch::errors::SectionwatchError;
use sectionwatch::types::OverlapPolicy;

fn dispatcher(options: DispatchOptions) -> Dispatcher {
    Dispatcher::new(
        registry_with("builder", &["2-reactivity", "3-testing"]),
        options,
    )
}

#[tokio::test]
async fn failed_build_does_not_stop_the_loop() {
    init_tracing();
    let (tx, rx) = mpsc::channel(32);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let runner = FakeBuildRunner::new(tx.clone(), Arc::clone(&executed)).failing("3-testing");
    let runtime = Runtime::new(dispatcher(DispatchOptions::default()), rx, runner);
    let handle = tokio::spawn(runtime.run());

    tx.send(root_change("builder", "3-testing/App.svelte")).await.unwrap();
    tx.send(root_change("builder", "2-reactivity/App.svelte")).await.unwrap();
    tx.send(site_change("README.md", ChangeKind::Modified)).await.unwrap();

    // Let the failure report come back before shutting down.
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(DispatchEvent::ShutdownRequested).await.unwrap();

    let result = with_timeout(handle).await.unwrap();
    assert!(result.is_ok(), "{result:?}");
    assert_eq!(
        built_sections(&executed),
        vec!["3-testing", "2-reactivity", "website"]
    );
}

#[tokio::test]
async fn watcher_failure_is_fatal() {
    init_tracing();
    let (tx, rx) = mpsc::channel(32);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let runner = FakeBuildRunner::new(tx.clone(), Arc::clone(&executed));
    let runtime = Runtime::new(dispatcher(DispatchOptions::default()), rx, runner);
    let handle = tokio::spawn(runtime.run());

    tx.send(DispatchEvent::WatchFailed {
        source: WatchSource::Root("builder".into()),
        message: "watch descriptor limit reached".into(),
    })
    .await
    .unwrap();

    let result = with_timeout(handle).await.unwrap();
    match result {
        Err(SectionwatchError::WatchLost(reason)) => {
            assert!(reason.contains("builder"), "{reason}");
            assert!(reason.contains("limit"), "{reason}");
        }
        other => panic!("expected WatchLost, got {other:?}"),
    }
    assert!(built_sections(&executed).is_empty());
}

#[tokio::test]
async fn loop_ends_when_all_senders_are_gone() {
    init_tracing();
    let (tx, rx) = mpsc::channel(8);
    let executed = Arc::new(Mutex::new(Vec::new()));
    // Hold builds open so no clone of the sender outlives this test's `tx`.
    let (runner_tx, _runner_rx) = mpsc::channel(8);
    let runner = FakeBuildRunner::new(runner_tx, Arc::clone(&executed)).hold_open();
    let runtime = Runtime::new(dispatcher(DispatchOptions::default()), rx, runner);
    let handle = tokio::spawn(runtime.run());

    tx.send(root_change("builder", "3-testing/a")).await.unwrap();
    drop(tx);

    assert!(with_timeout(handle).await.unwrap().is_ok());
    assert_eq!(built_sections(&executed), vec!["3-testing"]);
}

#[tokio::test]
async fn single_flight_waits_for_reported_completion() {
    init_tracing();
    let (tx, rx) = mpsc::channel(32);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let (runner_tx, _runner_rx) = mpsc::channel(8);
    let runner = FakeBuildRunner::new(runner_tx, Arc::clone(&executed)).hold_open();
    let options = DispatchOptions {
        quiet_window: Duration::from_millis(10),
        overlapping_builds: OverlapPolicy::SingleFlight,
        ..DispatchOptions::default()
    };
    let runtime = Runtime::new(dispatcher(options), rx, runner);
    let handle = tokio::spawn(runtime.run());

    tx.send(root_change("builder", "3-testing/a")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    // Past the window, but the held build never finished.
    tx.send(root_change("builder", "3-testing/a")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    tx.send(DispatchEvent::ShutdownRequested).await.unwrap();

    assert!(with_timeout(handle).await.unwrap().is_ok());
    assert_eq!(built_sections(&executed), vec!["3-testing"]);
}

#[cfg(unix)]
mod shell {
    use super::*;

    use sectionwatch::exec::ShellBuildRunner;
    use sectionwatch::registry::{Section, SectionOrigin, SectionRegistry};

    fn section(name: &str, command: &str, origin: SectionOrigin) -> Section {
        Section {
            name: name.to_string(),
            build_command: command.to_string(),
            origin,
        }
    }

    #[tokio::test]
    async fn failing_command_then_other_section_still_builds() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let registry = SectionRegistry::from_sections(
            section("website", "touch website.done", SectionOrigin::Site),
            [
                section("1-broken", "exit 1", SectionOrigin::Root("manual".into())),
                section("2-ok", "touch 2-ok.done", SectionOrigin::Root("manual".into())),
            ],
        );

        let (tx, rx) = mpsc::channel(32);
        let runner = ShellBuildRunner::new(dir.path(), tx.clone());
        let runtime = Runtime::new(Dispatcher::new(registry, DispatchOptions::default()), rx, runner);
        let handle = tokio::spawn(runtime.run());

        tx.send(root_change("manual", "1-broken/index.html")).await.unwrap();
        tx.send(root_change("manual", "2-ok/index.html")).await.unwrap();

        let marker = dir.path().join("2-ok.done");
        with_timeout(async {
            while !marker.exists() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await;

        tx.send(DispatchEvent::ShutdownRequested).await.unwrap();
        assert!(with_timeout(handle).await.unwrap().is_ok());
        assert!(!dir.path().join("website.done").exists());
    }
}
