//! Background loading of the highlighter.
//!
//! Building a syntect highlighter parses every bundled grammar, which takes
//! long enough to notice. The loader starts that work on a worker thread the
//! first time anyone asks and hands out [`HighlighterState::Pending`] until
//! it finishes. A failed load is remembered; nothing retries it.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;

use thiserror::Error;

use super::{HighlightSource, Highlighter, SyntectHighlighter};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load syntaxes from {path}: {message}")]
    Syntaxes { path: PathBuf, message: String },

    #[error("failed to load themes from {path}: {message}")]
    Themes { path: PathBuf, message: String },

    #[error("could not start loader thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("highlighter load was aborted")]
    Aborted,
}

/// What callers see of the loader.
#[derive(Debug)]
pub enum HighlighterState<H> {
    /// Load started but not finished
    Pending,
    Ready(Arc<H>),
    /// Load failed; highlighting stays off for the life of the loader
    Unavailable(Arc<LoadError>),
}

impl<H> Clone for HighlighterState<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Ready(highlighter) => Self::Ready(Arc::clone(highlighter)),
            Self::Unavailable(err) => Self::Unavailable(Arc::clone(err)),
        }
    }
}

impl<H> HighlighterState<H> {
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn highlighter(&self) -> Option<&H> {
        match self {
            Self::Ready(highlighter) => Some(&**highlighter),
            _ => None,
        }
    }

    /// The highlighter as a trait object, ready for render options.
    pub fn as_dyn(&self) -> Option<&dyn Highlighter>
    where
        H: Highlighter + 'static,
    {
        self.highlighter().map(|h| h as &dyn Highlighter)
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            Self::Unavailable(err) => Some(&**err),
            _ => None,
        }
    }
}

type LoadFn<H> = Box<dyn FnOnce() -> Result<H, LoadError> + Send>;

enum Slot<H> {
    Idle(LoadFn<H>),
    Loading,
    Ready(Arc<H>),
    Unavailable(Arc<LoadError>),
}

impl<H> Slot<H> {
    fn state(&self) -> HighlighterState<H> {
        match self {
            Self::Ready(highlighter) => HighlighterState::Ready(Arc::clone(highlighter)),
            Self::Unavailable(err) => HighlighterState::Unavailable(Arc::clone(err)),
            Self::Idle(_) | Self::Loading => HighlighterState::Pending,
        }
    }
}

struct Inner<H> {
    slot: Mutex<Slot<H>>,
    /// Signalled once when the slot leaves `Loading`
    settled: Condvar,
}

impl<H> Inner<H> {
    fn lock(&self) -> MutexGuard<'_, Slot<H>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Loads a highlighter once, off the calling thread.
///
/// The worker thread stores its result in the slot itself, so the slot lock
/// is only ever held for a state check and never across the load.
pub struct HighlighterLoader<H> {
    inner: Arc<Inner<H>>,
}

impl<H> std::fmt::Debug for HighlighterLoader<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.inner.lock() {
            Slot::Idle(_) => "idle",
            Slot::Loading => "loading",
            Slot::Ready(_) => "ready",
            Slot::Unavailable(_) => "unavailable",
        };
        f.debug_struct("HighlighterLoader")
            .field("state", &state)
            .finish()
    }
}

impl<H: Send + Sync + 'static> HighlighterLoader<H> {
    /// A loader that will run `load` on first use.
    pub fn new(load: impl FnOnce() -> Result<H, LoadError> + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot::Idle(Box::new(load))),
                settled: Condvar::new(),
            }),
        }
    }

    /// Current state, starting the load if it has not started. Never blocks
    /// on the load itself, even while another thread is in [`Self::wait`].
    pub fn poll(&self) -> HighlighterState<H> {
        let mut slot = self.inner.lock();
        self.start(&mut slot);
        slot.state()
    }

    /// Block until the load settles.
    pub fn wait(&self) -> HighlighterState<H> {
        let mut slot = self.inner.lock();
        self.start(&mut slot);
        let slot = self
            .inner
            .settled
            .wait_while(slot, |slot| matches!(slot, Slot::Loading))
            .unwrap_or_else(PoisonError::into_inner);
        slot.state()
    }

    fn start(&self, slot: &mut Slot<H>) {
        if !matches!(slot, Slot::Idle(_)) {
            return;
        }
        let Slot::Idle(load) = std::mem::replace(slot, Slot::Loading) else {
            return;
        };

        tracing::debug!("starting highlighter load");
        let inner = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name("highlighter-load".into())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(load))
                    .unwrap_or_else(|_| Err(LoadError::Aborted));
                let settled = match outcome {
                    Ok(highlighter) => Slot::Ready(Arc::new(highlighter)),
                    Err(err) => {
                        tracing::warn!(error = %err, "highlighter unavailable");
                        Slot::Unavailable(Arc::new(err))
                    }
                };
                *inner.lock() = settled;
                inner.settled.notify_all();
            });

        if let Err(err) = spawned {
            tracing::warn!(error = %err, "could not spawn highlighter loader");
            *slot = Slot::Unavailable(Arc::new(LoadError::Spawn(err)));
        }
    }
}

static SHARED: OnceLock<HighlighterLoader<SyntectHighlighter>> = OnceLock::new();

/// Choose extra syntax and theme folders for the process-wide loader.
///
/// Only takes effect before the first call to [`shared`]. Returns whether
/// this call configured the loader.
pub fn configure_shared(source: HighlightSource) -> bool {
    let mut configured = false;
    SHARED.get_or_init(|| {
        configured = true;
        HighlighterLoader::new(move || SyntectHighlighter::load(&source))
    });
    configured
}

/// The process-wide loader. Every caller shares one highlighter.
pub fn shared() -> &'static HighlighterLoader<SyntectHighlighter> {
    SHARED.get_or_init(|| {
        HighlighterLoader::new(|| SyntectHighlighter::load(&HighlightSource::default()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    #[derive(Debug, PartialEq)]
    struct Fake(u32);

    #[test]
    fn test_wait_returns_ready_highlighter() {
        let loader = HighlighterLoader::new(|| Ok(Fake(7)));
        let state = loader.wait();
        assert_eq!(state.highlighter(), Some(&Fake(7)));
    }

    #[test]
    fn test_poll_is_pending_while_load_runs() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let loader = HighlighterLoader::new(move || {
            let _ = release_rx.recv();
            Ok(Fake(1))
        });

        assert!(loader.poll().is_pending());
        assert!(loader.poll().is_pending());

        release_tx.send(()).unwrap();
        assert_eq!(loader.wait().highlighter(), Some(&Fake(1)));
    }

    #[test]
    fn test_poll_eventually_becomes_ready() {
        let loader = HighlighterLoader::new(|| Ok(Fake(2)));
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let state = loader.poll();
            if let Some(fake) = state.highlighter() {
                assert_eq!(fake, &Fake(2));
                break;
            }
            assert!(Instant::now() < deadline, "loader never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_load_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let loader = HighlighterLoader::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(Fake(3))
        });

        loader.wait();
        loader.wait();
        loader.poll();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_poll_does_not_wait_behind_a_waiter() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let loader = HighlighterLoader::new(move || {
            let _ = release_rx.recv();
            Ok(Fake(4))
        });

        thread::scope(|scope| {
            let waiter = scope.spawn(|| loader.wait());
            thread::sleep(Duration::from_millis(50));

            let (polled_tx, polled_rx) = mpsc::channel();
            let loader = &loader;
            scope.spawn(move || {
                let _ = polled_tx.send(loader.poll().is_pending());
            });
            let polled = polled_rx.recv_timeout(Duration::from_millis(500));

            release_tx.send(()).unwrap();
            assert_eq!(polled, Ok(true));
            assert_eq!(waiter.join().unwrap().highlighter(), Some(&Fake(4)));
        });
    }

    #[test]
    fn test_concurrent_callers_share_one_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let loader = HighlighterLoader::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            let _ = release_rx.recv();
            Ok(Fake(5))
        });

        let states: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let loader = &loader;
                    scope.spawn(move || {
                        if i % 2 == 0 {
                            loader.poll();
                        }
                        loader.wait()
                    })
                })
                .collect();
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).unwrap();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let ready: Vec<Arc<Fake>> = states
            .into_iter()
            .map(|state| match state {
                HighlighterState::Ready(highlighter) => highlighter,
                other => panic!("expected a ready highlighter, got {other:?}"),
            })
            .collect();
        assert!(ready.iter().all(|h| Arc::ptr_eq(h, &ready[0])));
        assert_eq!(*ready[0], Fake(5));
    }

    #[test]
    fn test_failure_is_sticky() {
        let loader: HighlighterLoader<Fake> = HighlighterLoader::new(|| {
            Err(LoadError::Themes {
                path: PathBuf::from("themes"),
                message: "bad theme".into(),
            })
        });

        let state = loader.wait();
        assert!(state.highlighter().is_none());
        assert!(matches!(state.error(), Some(LoadError::Themes { .. })));
        assert!(loader.poll().error().is_some());
    }

    #[test]
    fn test_panicking_load_is_reported_as_aborted() {
        let loader: HighlighterLoader<Fake> = HighlighterLoader::new(|| panic!("boom"));
        assert!(matches!(loader.wait().error(), Some(LoadError::Aborted)));
    }

    #[test]
    fn test_shared_loader_yields_syntect_highlighter() {
        let state = shared().wait();
        assert!(state.as_dyn().is_some());
    }
}
