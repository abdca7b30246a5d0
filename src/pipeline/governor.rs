//! Idle-timeout governor for optional post-processing.
//!
//! Formatting is expensive and skippable. The governor watches every
//! optional operation in one conversion run: each operation registers with
//! [`FormatGovernor::begin`] and reports progress through
//! [`ActivityGuard::tick`]. If the configured idle duration passes with
//! operations active but no ticks observed, the governor cancels a token
//! dedicated to optional work — irreversibly, and independently of the
//! conversion's top-level token. From then on every optional operation
//! falls back to its cheap path; the degradation is logged exactly once.
//!
//! One governor is owned per conversion run, never shared process-wide, so
//! runs cannot interfere and tests can drive it on virtual time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub struct FormatGovernor {
    shared: Arc<Shared>,
}

struct Shared {
    idle: Duration,
    cancel: CancellationToken,
    /// Guards the active count and the watchdog handle together. Enabling
    /// and disabling the watchdog re-checks the count under this lock, so a
    /// finishing operation cannot race a starting one into a dead timer.
    state: Mutex<WatchState>,
    deadline: Mutex<Instant>,
    fallback_logged: AtomicBool,
    fallbacks: AtomicUsize,
}

struct WatchState {
    active: usize,
    watchdog: Option<JoinHandle<()>>,
}

/// Registration of one optional operation. Dropping it deregisters.
pub struct ActivityGuard {
    shared: Arc<Shared>,
}

impl ActivityGuard {
    /// Reports observed activity, pushing the idle deadline out.
    pub fn tick(&self) {
        *self.shared.deadline.lock() = Instant::now() + self.shared.idle;
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.active -= 1;
        if state.active == 0 {
            // Re-checked under the lock: nobody started in between.
            if let Some(watchdog) = state.watchdog.take() {
                watchdog.abort();
            }
        }
    }
}

impl FormatGovernor {
    pub fn new(idle: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                idle,
                cancel: CancellationToken::new(),
                state: Mutex::new(WatchState {
                    active: 0,
                    watchdog: None,
                }),
                deadline: Mutex::new(Instant::now() + idle),
                fallback_logged: AtomicBool::new(false),
                fallbacks: AtomicUsize::new(0),
            }),
        }
    }

    /// Token governing all optional operations of this run. Cancelled once
    /// the idle timeout fires; never un-cancelled.
    pub fn token(&self) -> CancellationToken {
        self.shared.cancel.clone()
    }

    /// Registers an optional operation. Starts the watchdog if this is the
    /// first active operation and the governor has not already tripped.
    pub fn begin(&self) -> ActivityGuard {
        let mut state = self.shared.state.lock();
        state.active += 1;
        *self.shared.deadline.lock() = Instant::now() + self.shared.idle;
        if state.watchdog.is_none() && !self.shared.cancel.is_cancelled() {
            state.watchdog = Some(tokio::spawn(watch(Arc::clone(&self.shared))));
        }
        drop(state);
        ActivityGuard {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Runs one optional operation, falling back to `cheap` if the governor
    /// has tripped or trips mid-operation. The first fallback of the run
    /// logs a single warning.
    pub fn run_or_fallback<T>(
        &self,
        expensive: impl FnOnce(&CancellationToken) -> Option<T>,
        cheap: impl FnOnce() -> T,
    ) -> T {
        if !self.shared.cancel.is_cancelled() {
            let guard = self.begin();
            guard.tick();
            if let Some(value) = expensive(&self.shared.cancel) {
                return value;
            }
        }
        self.note_fallback();
        cheap()
    }

    fn note_fallback(&self) {
        self.shared.fallbacks.fetch_add(1, Ordering::Relaxed);
        if !self.shared.fallback_logged.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                idle_ms = self.shared.idle.as_millis() as u64,
                "formatting idle timeout reached; falling back to plain normalization"
            );
        }
    }

    /// How many operations have taken the cheap path so far.
    pub fn fallback_count(&self) -> usize {
        self.shared.fallbacks.load(Ordering::Relaxed)
    }

    /// Whether the single degradation warning has been emitted.
    pub fn fallback_logged(&self) -> bool {
        self.shared.fallback_logged.load(Ordering::Relaxed)
    }
}

async fn watch(shared: Arc<Shared>) {
    loop {
        let deadline = *shared.deadline.lock();
        tokio::time::sleep_until(deadline).await;
        if *shared.deadline.lock() > Instant::now() {
            // Activity arrived while we slept.
            continue;
        }
        let state = shared.state.lock();
        if state.active > 0 {
            shared.cancel.cancel();
        }
        return;
    }
}
