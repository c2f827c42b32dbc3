//! Card file watching for `render --watch`.
//!
//! Watches the card's parent directory rather than the file itself, since
//! editors often save by writing a new file and renaming it over the old
//! one. Bursts of events settle for a debounce period before a change is
//! reported.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Debounce used by the CLI.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches one card file and reports debounced changes.
pub struct CardWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    card_path: PathBuf,
    card_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl CardWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if the platform watcher cannot be created or the
    /// card's directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Event paths arrive canonical.
        let card_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let card_name = card_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&card_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        tracing::debug!(card = %card_path.display(), root = %watch_root.display(), "watching card");

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            card_path,
            card_name,
            debounce,
            pending_since: None,
        })
    }

    pub fn card_path(&self) -> &Path {
        &self.card_path
    }

    /// Drain pending events. Returns true once a change has settled.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(ev) => {
                    ignored += 1;
                    tracing::trace!(kind = ?ev.kind, paths = ?ev.paths, "ignoring event");
                }
                Err(err) => tracing::warn!(%err, "watch error"),
            }
        }

        if relevant + ignored > 0 {
            tracing::debug!(relevant, ignored, "watcher drained events");
        }
        if relevant > 0 {
            self.pending_since = Some(Instant::now());
        }

        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Block until the card changes, checking every `poll`.
    pub fn wait_for_change(&mut self, poll: Duration) {
        while !self.take_change_ready() {
            thread::sleep(poll);
        }
    }

    /// Reads are ignored; rendering the card reads it.
    fn is_relevant(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        event.paths.iter().any(|path| self.touches_card(path))
    }

    fn touches_card(&self, path: &Path) -> bool {
        if path == self.watch_root || path == self.card_path {
            return true;
        }
        // A save renamed over the card may report a non-canonical path.
        self.card_name.as_deref().is_some_and(|name| path.file_name() == Some(name))
    }
}

fn watch_root_for(card: &Path) -> PathBuf {
    match card.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
