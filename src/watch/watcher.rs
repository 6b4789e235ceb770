// src/watch/watcher.rs

use std::io;
use std::path::Path;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::engine::{ChangeKind, DispatchEvent, WatchSource};
use crate::errors::{Result, SectionwatchError};
use crate::watch::patterns::WatchProfiles;

/// Keeps the underlying watchers alive. Dropping it stops all watching.
pub struct WatcherHandle {
    _watchers: Vec<RecommendedWatcher>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("subscriptions", &self._watchers.len())
            .finish()
    }
}

/// Map a `notify` event kind onto the dispatcher's [`ChangeKind`].
///
/// Access events and metadata-only modifications are not content changes
/// and yield `None`; a build that touches timestamps must not retrigger
/// itself.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Any => Some(ChangeKind::Other),
        EventKind::Access(_) | EventKind::Other => None,
    }
}

/// Errors that only mean a path vanished between the event and the watcher
/// looking at it.
fn is_transient(err: &notify::Error) -> bool {
    match &err.kind {
        notify::ErrorKind::PathNotFound | notify::ErrorKind::WatchNotFound => true,
        notify::ErrorKind::Io(io_err) => io_err.kind() == io::ErrorKind::NotFound,
        _ => false,
    }
}

/// Start one subscription per root (recursive) and one for the site files
/// (the project root, non-recursive), forwarding routed changes to
/// `events`.
///
/// Failing to set up any subscription is fatal and names the source.
pub fn spawn_watchers(
    profiles: WatchProfiles,
    events: mpsc::Sender<DispatchEvent>,
) -> Result<WatcherHandle> {
    // notify calls back on its own thread; hop into async through an
    // unbounded channel.
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<DispatchEvent>();

    let mut watchers = Vec::with_capacity(profiles.roots.len() + 1);

    for root in profiles.roots {
        let dir = root.dir().to_path_buf();
        let source = WatchSource::Root(root.id().to_string());
        let tx = raw_tx.clone();
        let handler_source = source.clone();

        let watcher = subscribe(&dir, RecursiveMode::Recursive, move |res| match res {
            Ok(event) => forward(&tx, &handler_source, &event, |path, kind| root.route(path, kind)),
            Err(err) => report(&tx, &handler_source, err),
        })
        .map_err(|error| SectionwatchError::Watch {
            source_name: format!("{source} at {dir:?}"),
            error,
        })?;

        info!(source = %source, dir = ?dir, "watching");
        watchers.push(watcher);
    }

    let site = profiles.site;
    let site_dir = site.dir().to_path_buf();
    let files: Vec<String> = site.files().map(str::to_string).collect();
    let tx = raw_tx.clone();
    let watcher = subscribe(&site_dir, RecursiveMode::NonRecursive, move |res| match res {
        Ok(event) => forward(&tx, &WatchSource::Site, &event, |path, kind| site.route(path, kind)),
        Err(err) => report(&tx, &WatchSource::Site, err),
    })
    .map_err(|error| SectionwatchError::Watch {
        source_name: format!("site files in {site_dir:?}"),
        error,
    })?;
    info!(source = "site", dir = ?site_dir, ?files, "watching");
    watchers.push(watcher);

    drop(raw_tx);

    tokio::spawn(async move {
        while let Some(event) = raw_rx.recv().await {
            if events.send(event).await.is_err() {
                debug!("dispatcher gone; watcher forwarding stopped");
                return;
            }
        }
        debug!("all watchers dropped; forwarding finished");
    });

    Ok(WatcherHandle {
        _watchers: watchers,
    })
}

fn subscribe<F>(dir: &Path, mode: RecursiveMode, handler: F) -> notify::Result<RecommendedWatcher>
where
    F: FnMut(notify::Result<Event>) + Send + 'static,
{
    let mut watcher = RecommendedWatcher::new(handler, Config::default())?;
    watcher.watch(dir, mode)?;
    Ok(watcher)
}

fn forward<R>(
    tx: &mpsc::UnboundedSender<DispatchEvent>,
    source: &WatchSource,
    event: &Event,
    mut route: R,
) where
    R: FnMut(&Path, ChangeKind) -> Option<DispatchEvent>,
{
    let Some(kind) = change_kind(&event.kind) else {
        trace!(source = %source, ?event, "not a content change");
        return;
    };

    for path in event.paths.iter() {
        match route(path, kind) {
            Some(routed) => {
                // The receiver only goes away on shutdown.
                let _ = tx.send(routed);
            }
            None => trace!(source = %source, ?path, "filtered out"),
        }
    }
}

fn report(tx: &mpsc::UnboundedSender<DispatchEvent>, source: &WatchSource, err: notify::Error) {
    if is_transient(&err) {
        warn!(source = %source, error = %err, "watched path vanished");
        return;
    }
    let _ = tx.send(DispatchEvent::WatchFailed {
        source: source.clone(),
        message: err.to_string(),
    });
}
