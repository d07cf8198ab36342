//! Reloading the diagram source when its file changes on disk.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Collapses a burst of events into one change, reported once the burst
/// has been quiet for `delay`.
#[derive(Debug, Clone, Copy)]
struct Settle {
    delay: Duration,
    last_event: Option<Instant>,
}

impl Settle {
    const fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_event: None,
        }
    }

    const fn note(&mut self, at: Instant) {
        self.last_event = Some(at);
    }

    fn ready(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(at) if now.duration_since(at) >= self.delay => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

/// Watches the parent directory of one source file. Editors often save by
/// writing a new file and renaming it over the old one, which a watch on
/// the file itself would miss.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    path: PathBuf,
    file_name: Option<OsString>,
    settle: Settle,
}

impl SourceWatcher {
    /// # Errors
    ///
    /// Returns an error if the platform watcher cannot be created or the
    /// parent directory cannot be watched.
    pub fn new(path: &Path, delay: Duration) -> notify::Result<Self> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let file_name = path.file_name().map(ToOwned::to_owned);
        let dir = parent_dir(&path);

        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |event| {
            let _ = tx.send(event);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %path.display(), "watching source file");

        Ok(Self {
            _watcher: watcher,
            events,
            path,
            file_name,
            settle: Settle::new(delay),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending events; returns `true` once a change has settled.
    pub fn poll_changed(&mut self) -> bool {
        let now = Instant::now();
        while let Ok(event) = self.events.try_recv() {
            match event {
                Ok(event) if self.concerns_source(&event) => self.settle.note(now),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "file watcher error");
                    crate::perf::log_event("watcher.error", err.to_string());
                }
            }
        }
        let changed = self.settle.ready(now);
        if changed {
            crate::perf::log_event("watcher.changed", self.path.display().to_string());
        }
        changed
    }

    fn concerns_source(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        event.paths.iter().any(|path| {
            path == &self.path
                || self
                    .file_name
                    .as_deref()
                    .is_some_and(|name| path.file_name() == Some(name))
        })
    }
}

impl std::fmt::Debug for SourceWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWatcher")
            .field("path", &self.path)
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
