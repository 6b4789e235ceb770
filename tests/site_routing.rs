// tests/site_routing.rs

mod common;
use crate::common::builders::{registry_with, site_change};
use crate::common::init_tracing;

use std::path::Path;
use std::time::Instant;

use sectionwatch::config::ConfigFile;
use sectionwatch::engine::{ChangeKind, DispatchCommand, DispatchEvent, DispatchOptions, Dispatcher, WatchSource};
use sectionwatch::watch::patterns::build_profiles_from_config;

#[test]
fn readme_modification_builds_website() {
    init_tracing();
    let mut d = Dispatcher::new(registry_with("manual", &["1-intro"]), DispatchOptions::default());

    let step = d.step(site_change("README.md", ChangeKind::Modified), Instant::now());
    match &step.commands[..] {
        [DispatchCommand::RunBuild(req)] => {
            assert_eq!(req.section, "website");
            assert_eq!(req.command, "build website");
            assert_eq!(req.path, "README.md");
        }
        other => panic!("expected one website build, got {other:?}"),
    }
}

#[test]
fn site_debounces_like_any_section() {
    init_tracing();
    let mut d = Dispatcher::new(registry_with("manual", &[]), DispatchOptions::default());
    let t0 = Instant::now();

    let first = d.step(site_change("README.md", ChangeKind::Modified), t0);
    let second = d.step(site_change("build.js", ChangeKind::Modified), t0);
    assert_eq!(first.commands.len(), 1);
    assert!(second.commands.is_empty());
}

#[test]
fn site_profile_routes_listed_files_unless_removed() {
    init_tracing();
    let profiles = build_profiles_from_config(Path::new("/proj"), &ConfigFile::default()).unwrap();
    let site = &profiles.site;

    let routed = site.route(Path::new("/proj/README.md"), ChangeKind::Modified);
    assert!(matches!(
        routed,
        Some(DispatchEvent::Change { source: WatchSource::Site, ref path, .. }) if path == "README.md"
    ));
    assert!(site.route(Path::new("/proj/build.js"), ChangeKind::Modified).is_some());

    // Unlisted files in the project root.
    assert!(site.route(Path::new("/proj/package.json"), ChangeKind::Modified).is_none());
    // Same file name deeper in the tree.
    assert!(site.route(Path::new("/proj/manual/README.md"), ChangeKind::Modified).is_none());
    // Saving through a temp file shows up as a create or rename of the
    // listed name.
    for kind in [ChangeKind::Created, ChangeKind::Renamed, ChangeKind::Other] {
        assert!(site.route(Path::new("/proj/README.md"), kind).is_some(), "{kind}");
    }
    // The temp file itself is not listed.
    assert!(site.route(Path::new("/proj/.README.md.tmp"), ChangeKind::Renamed).is_none());
    assert!(site.route(Path::new("/proj/README.md"), ChangeKind::Removed).is_none());
}

#[test]
fn replaced_readme_builds_website_and_removed_one_does_not() {
    init_tracing();
    let mut d = Dispatcher::new(registry_with("manual", &[]), DispatchOptions::default());
    let t0 = Instant::now();

    assert!(d.step(site_change("README.md", ChangeKind::Removed), t0).commands.is_empty());

    let step = d.step(site_change("README.md", ChangeKind::Renamed), t0);
    assert!(matches!(
        &step.commands[..],
        [DispatchCommand::RunBuild(req)] if req.section == "website"
    ));
}
