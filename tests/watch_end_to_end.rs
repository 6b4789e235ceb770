// tests/watch_end_to_end.rs
//
// Real `notify` watchers on a temporary project, with builds recorded by
// the fake runner.

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::fake_runner::{built_sections, FakeBuildRunner};
use crate::common::{init_tracing, with_timeout};

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use sectionwatch::engine::{BuildRequest, DispatchEvent, DispatchOptions, Dispatcher, Runtime};
use sectionwatch::fs::RealFileSystem;
use sectionwatch::registry::SectionRegistry;
use sectionwatch::watch::{build_profiles_from_config, spawn_watchers};

fn tutorial_project(root: &Path) {
    fs::create_dir_all(root.join("manual/1-intro")).unwrap();
    fs::create_dir_all(root.join("builder/3-testing")).unwrap();
    fs::write(root.join("README.md"), "# Tutorial\n").unwrap();
    fs::write(root.join("package.json"), "{}\n").unwrap();
}

async fn wait_for<F>(executed: &Arc<Mutex<Vec<BuildRequest>>>, mut done: F)
where
    F: FnMut(&[BuildRequest]) -> bool,
{
    with_timeout(async {
        loop {
            if done(executed.lock().unwrap().as_slice()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn source_edits_build_and_build_output_does_not() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    tutorial_project(&root);

    let cfg = ConfigFileBuilder::new().build();
    let profiles = build_profiles_from_config(&root, &cfg).unwrap();
    let registry = SectionRegistry::scan(&cfg, &profiles, &RealFileSystem).unwrap();
    assert!(registry.contains("3-testing"));

    let (tx, rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let watchers = spawn_watchers(profiles, tx.clone()).unwrap();
    let runner = FakeBuildRunner::new(tx.clone(), Arc::clone(&executed));
    let runtime = Runtime::new(
        Dispatcher::new(registry, DispatchOptions::from_config(&cfg.config)),
        rx,
        runner,
    );
    let handle = tokio::spawn(runtime.run());

    // Give the OS watchers a moment to arm.
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Output first: if it were routed it would open the burst and be the
    // recorded path.
    fs::write(root.join("builder/3-testing/build.js"), "bundle();\n").unwrap();
    fs::write(root.join("builder/3-testing/App.svelte"), "<h1>hi</h1>\n").unwrap();

    wait_for(&executed, |reqs| !reqs.is_empty()).await;
    {
        let reqs = executed.lock().unwrap();
        assert_eq!(reqs[0].section, "3-testing");
        assert_eq!(reqs[0].path, "3-testing/App.svelte");
    }

    // Unlisted top-level files do not touch the site section.
    fs::write(root.join("package.json"), "{ \"name\": \"t\" }\n").unwrap();
    fs::write(root.join("README.md"), "# Tutorial\n\nMore.\n").unwrap();
    wait_for(&executed, |reqs| reqs.iter().any(|r| r.section == "website")).await;

    let website: Vec<BuildRequest> = executed
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.section == "website")
        .cloned()
        .collect();
    assert_eq!(website[0].path, "README.md");
    assert!(built_sections(&executed).iter().all(|s| s == "3-testing" || s == "website"));

    tx.send(DispatchEvent::ShutdownRequested).await.unwrap();
    assert!(with_timeout(handle).await.unwrap().is_ok());
    drop(watchers);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn atomic_save_of_readme_builds_website() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    tutorial_project(&root);

    let cfg = ConfigFileBuilder::new().build();
    let profiles = build_profiles_from_config(&root, &cfg).unwrap();
    let registry = SectionRegistry::scan(&cfg, &profiles, &RealFileSystem).unwrap();

    let (tx, rx) = mpsc::channel(64);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let watchers = spawn_watchers(profiles, tx.clone()).unwrap();
    let runner = FakeBuildRunner::new(tx.clone(), Arc::clone(&executed));
    let runtime = Runtime::new(
        Dispatcher::new(registry, DispatchOptions::from_config(&cfg.config)),
        rx,
        runner,
    );
    let handle = tokio::spawn(runtime.run());

    tokio::time::sleep(Duration::from_millis(200)).await;

    // Write a sibling temp file, then rename it over the original.
    let tmp = root.join(".README.md.tmp");
    fs::write(&tmp, "# Tutorial\n\nSaved atomically.\n").unwrap();
    fs::rename(&tmp, root.join("README.md")).unwrap();

    wait_for(&executed, |reqs| reqs.iter().any(|r| r.section == "website")).await;
    {
        let reqs = executed.lock().unwrap();
        let website: Vec<&BuildRequest> = reqs.iter().filter(|r| r.section == "website").collect();
        assert_eq!(website.len(), 1);
        assert_eq!(website[0].path, "README.md");
    }

    tx.send(DispatchEvent::ShutdownRequested).await.unwrap();
    assert!(with_timeout(handle).await.unwrap().is_ok());
    drop(watchers);
}

#[tokio::test]
async fn watching_a_missing_root_fails_with_its_name() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::create_dir_all(root.join("manual")).unwrap();

    let cfg = ConfigFileBuilder::new().build();
    let profiles = build_profiles_from_config(&root, &cfg).unwrap();
    let (tx, _rx) = mpsc::channel(8);

    let err = spawn_watchers(profiles, tx).unwrap_err();
    assert!(err.to_string().contains("builder"), "{err}");
}
