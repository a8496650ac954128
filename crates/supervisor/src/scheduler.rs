//! Deferred one-shot execution.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A task to run once after a delay.
pub type Deferred = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The facility refused the request (background restrictions, quota).
    #[error("deferred execution rejected: {0}")]
    Rejected(String),
}

/// The host's deferred-execution facility (alarm, job scheduler, timer).
pub trait Scheduler: Send + Sync {
    fn schedule_one_shot(&self, delay: Duration, task: Deferred) -> Result<(), ScheduleError>;
}

/// Runs each task on its own short-lived thread.
///
/// Only survives as long as the process does; hosts that can be killed
/// outright should back this with an OS alarm instead.
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule_one_shot(&self, delay: Duration, task: Deferred) -> Result<(), ScheduleError> {
        std::thread::Builder::new()
            .name("focusgate-deferred".into())
            .spawn(move || {
                std::thread::sleep(delay);
                task();
            })
            .map(|_| ())
            .map_err(|e| ScheduleError::Rejected(e.to_string()))
    }
}

/// Scheduler that holds tasks until told to run them.
///
/// For tests and hosts that drive time themselves.
#[derive(Default)]
pub struct ManualScheduler {
    pending: Mutex<Vec<(Duration, Deferred)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(Duration, Deferred)>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Delays of the tasks waiting to run.
    pub fn pending_delays(&self) -> Vec<Duration> {
        self.lock().iter().map(|(delay, _)| *delay).collect()
    }

    /// Remove and return the pending tasks in scheduling order.
    pub fn take_pending(&self) -> Vec<(Duration, Deferred)> {
        std::mem::take(&mut *self.lock())
    }

    /// Run every pending task, returning how many ran.
    pub fn run_pending(&self) -> usize {
        // Tasks may schedule more work; drain before running.
        let tasks = self.take_pending();
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_one_shot(&self, delay: Duration, task: Deferred) -> Result<(), ScheduleError> {
        self.lock().push((delay, task));
        Ok(())
    }
}
