//! Timer loop driving the poller + controller pair.

use crate::controller::{Decision, EnforcementController};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use focusgate_foreground::{ForegroundPoller, ForegroundSample};
use focusgate_policy::PolicyStoreRef;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

/// Default tick period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// What one tick observed and decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub sample: Option<ForegroundSample>,
    pub decision: Option<Decision>,
}

struct LoopInner {
    store: PolicyStoreRef,
    poller: ForegroundPoller,
    controller: EnforcementController,
    ticks: AtomicU64,
}

impl LoopInner {
    fn tick(&self, now_ms: i64) -> TickOutcome {
        let policy = self.store.get();
        let sample = self.poller.poll(&policy, now_ms);
        let decision = sample
            .as_ref()
            .map(|s| self.controller.on_sample(&policy, s, now_ms));
        self.ticks.fetch_add(1, Ordering::Relaxed);
        TickOutcome { sample, decision }
    }

    // A panicking collaborator must not take the loop down with it.
    fn guarded_tick(&self, now_ms: i64) {
        if catch_unwind(AssertUnwindSafe(|| self.tick(now_ms))).is_err() {
            self.ticks.fetch_add(1, Ordering::Relaxed);
            tracing::error!(now_ms, "enforcement tick panicked, continuing");
        }
    }
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Single cooperative timer loop for the poller and controller.
///
/// The loop keeps ticking while the session is inactive; the poller simply
/// skips its OS queries, so activation takes effect on the next tick.
pub struct EnforcementLoop {
    inner: Arc<LoopInner>,
    interval: Duration,
    worker: Mutex<Option<Worker>>,
}

impl EnforcementLoop {
    pub fn new(store: PolicyStoreRef, poller: ForegroundPoller, controller: EnforcementController) -> Self {
        Self {
            inner: Arc::new(LoopInner {
                store,
                poller,
                controller,
                ticks: AtomicU64::new(0),
            }),
            interval: DEFAULT_POLL_INTERVAL,
            worker: Mutex::new(None),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn controller(&self) -> &EnforcementController {
        &self.inner.controller
    }

    /// Number of ticks run so far, including ticks that panicked.
    pub fn ticks(&self) -> u64 {
        self.inner.ticks.load(Ordering::Relaxed)
    }

    /// Run one tick synchronously at `now_ms`.
    pub fn tick_at(&self, now_ms: i64) -> TickOutcome {
        self.inner.tick(now_ms)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Spawn the loop thread. Returns false if it is already running.
    pub fn start(&self) -> bool {
        let mut worker = self.lock();
        if let Some(existing) = worker.as_ref() {
            if !existing.handle.is_finished() {
                tracing::debug!("enforcement loop already running");
                return false;
            }
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let inner = Arc::clone(&self.inner);
        let interval = self.interval;

        let spawned = std::thread::Builder::new()
            .name("focusgate-enforcement".into())
            .spawn(move || {
                tracing::info!("enforcement loop started with interval {:?}", interval);
                loop {
                    inner.guarded_tick(chrono::Utc::now().timestamp_millis());
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::info!("enforcement loop stopped");
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(Worker { stop_tx, handle });
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn enforcement loop");
                false
            }
        }
    }

    /// Cancel the loop and wait for the thread to exit.
    pub fn stop(&self) {
        let worker = self.lock().take();
        if let Some(worker) = worker {
            let _ = worker.stop_tx.try_send(());
            if worker.handle.join().is_err() {
                tracing::error!("enforcement loop thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }
}

impl Drop for EnforcementLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
