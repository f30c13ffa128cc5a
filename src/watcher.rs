//! Watches the content directory.
//!
//! File system notifications are translated to [`WatchEvent`]s and sent to a
//! bounded channel. The notification callback runs on the watcher's own
//! thread, so it blocks on a full channel instead of dropping events.
use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use swarmshare_located_error::{Located, LocatedError};
use tokio::sync::mpsc;

/// A change in the content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file appeared, or was renamed into the directory.
    Created(PathBuf),

    /// A file was removed, or renamed out of the directory.
    Removed(PathBuf),

    /// The contents of a file changed.
    Modified(PathBuf),
}

impl WatchEvent {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Created(path) | WatchEvent::Removed(path) | WatchEvent::Modified(path) => path,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone)]
#[error("Unable to watch {path}: {source}")]
pub struct WatchError {
    pub path: PathBuf,
    pub source: LocatedError<'static, notify::Error>,
}

/// Keeps the watch alive. The watch stops when it is dropped.
pub struct ContentWatcher {
    _watcher: RecommendedWatcher,
}

impl ContentWatcher {
    /// Starts watching `dir`, not recursively.
    ///
    /// # Errors
    ///
    /// Will return an error if the watch can not be set up.
    pub fn start(dir: &Path, sender: mpsc::Sender<WatchEvent>) -> Result<Self, WatchError> {
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
            Ok(event) => {
                for watch_event in to_watch_events(&event) {
                    tracing::debug!(?watch_event, "content changed");

                    if sender.blocking_send(watch_event).is_err() {
                        tracing::debug!("watch event receiver dropped");
                        return;
                    }
                }
            }
            Err(err) => tracing::warn!("content watch error: {err}"),
        })
        .map_err(|err| WatchError {
            path: dir.to_path_buf(),
            source: Located(err).into(),
        })?;

        watcher.watch(dir, RecursiveMode::NonRecursive).map_err(|err| WatchError {
            path: dir.to_path_buf(),
            source: Located(err).into(),
        })?;

        tracing::info!(dir = %dir.display(), "watching the content directory");

        Ok(Self { _watcher: watcher })
    }
}

/// Translates a notification to the changes the agent cares about.
#[must_use]
pub fn to_watch_events(event: &Event) -> Vec<WatchEvent> {
    let paths = event.paths.iter().cloned();

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => paths.map(WatchEvent::Created).collect(),
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => paths.map(WatchEvent::Removed).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match event.paths.as_slice() {
            [from, to] => vec![WatchEvent::Removed(from.clone()), WatchEvent::Created(to.clone())],
            _ => Vec::new(),
        },
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => paths.map(WatchEvent::Modified).collect(),
        _ => Vec::new(),
    }
}
