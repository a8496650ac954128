//! Resilience supervisor - keeps the enforcement loop alive.

use crate::scheduler::{Scheduler, ThreadScheduler};
use crate::status::{EngineStatus, SupervisorState};
use focusgate_enforcement::EnforcementLoop;
use focusgate_events::{event_names, publish, EventBusRef, NullEventBus};
use focusgate_policy::PolicyStoreRef;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// Default delay before restarting after the task is removed.
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_millis(500);

/// Start/stop control over the supervised loop.
pub trait LoopControl: Send + Sync {
    /// Start the loop. Returns false if it could not be started or already runs.
    fn start(&self) -> bool;
    fn stop(&self);
    fn is_running(&self) -> bool;
}

impl LoopControl for EnforcementLoop {
    fn start(&self) -> bool {
        EnforcementLoop::start(self)
    }

    fn stop(&self) {
        EnforcementLoop::stop(self)
    }

    fn is_running(&self) -> bool {
        EnforcementLoop::is_running(self)
    }
}

/// External lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Start,
    Stop,
    /// The user removed the host from the recent-tasks list.
    TaskRemoved,
    /// The host process came up without an explicit command.
    ColdStart,
}

#[derive(Debug, Default)]
struct Core {
    state: SupervisorState,
    /// Bumped by every explicit start or stop so a pending restart becomes stale.
    generation: u64,
    restart_pending: bool,
}

struct Inner {
    store: PolicyStoreRef,
    runner: Arc<dyn LoopControl>,
    scheduler: Arc<dyn Scheduler>,
    restart_delay: Duration,
    bus: EventBusRef,
    core: Mutex<Core>,
}

/// Drives the `Stopped -> Starting -> Running -> Stopped` lifecycle from
/// discrete signals.
///
/// Task removal during a session stops the loop and schedules a deferred
/// restart; a cold start with an active session resumes enforcement without
/// any command.
#[derive(Clone)]
pub struct ResilienceSupervisor {
    inner: Arc<Inner>,
}

impl ResilienceSupervisor {
    pub fn new(store: PolicyStoreRef, runner: Arc<dyn LoopControl>) -> Self {
        Self::builder(store, runner).build()
    }

    pub fn builder(store: PolicyStoreRef, runner: Arc<dyn LoopControl>) -> SupervisorBuilder {
        SupervisorBuilder {
            store,
            runner,
            scheduler: Arc::new(ThreadScheduler),
            restart_delay: DEFAULT_RESTART_DELAY,
            bus: Arc::new(NullEventBus),
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.inner.lock().state
    }

    pub fn restart_pending(&self) -> bool {
        self.inner.lock().restart_pending
    }

    pub fn status(&self) -> EngineStatus {
        let policy = self.inner.store.get();
        EngineStatus {
            session_active: policy.session_active,
            has_credentials: !policy.credentials.is_empty(),
            supervisor: self.state(),
        }
    }

    /// Apply a lifecycle signal and return the resulting state.
    pub fn handle(&self, signal: Signal) -> SupervisorState {
        tracing::debug!(?signal, "supervisor signal");
        match signal {
            Signal::Start => self.inner.start(),
            Signal::Stop => self.inner.stop(),
            Signal::TaskRemoved => self.inner.task_removed(),
            Signal::ColdStart => self.inner.cold_start(),
        }
        self.state()
    }

    pub fn start(&self) -> SupervisorState {
        self.handle(Signal::Start)
    }

    pub fn stop(&self) -> SupervisorState {
        self.handle(Signal::Stop)
    }

    pub fn task_removed(&self) -> SupervisorState {
        self.handle(Signal::TaskRemoved)
    }

    pub fn cold_start(&self) -> SupervisorState {
        self.handle(Signal::ColdStart)
    }

    /// Publish the current status without a transition, e.g. after a toggle.
    pub fn announce(&self) {
        self.inner.announce(&[self.state()]);
    }
}

pub struct SupervisorBuilder {
    store: PolicyStoreRef,
    runner: Arc<dyn LoopControl>,
    scheduler: Arc<dyn Scheduler>,
    restart_delay: Duration,
    bus: EventBusRef,
}

impl SupervisorBuilder {
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    pub fn bus(mut self, bus: EventBusRef) -> Self {
        self.bus = bus;
        self
    }

    pub fn build(self) -> ResilienceSupervisor {
        ResilienceSupervisor {
            inner: Arc::new(Inner {
                store: self.store,
                runner: self.runner,
                scheduler: self.scheduler,
                restart_delay: self.restart_delay,
                bus: self.bus,
                core: Mutex::new(Core::default()),
            }),
        }
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn announce(&self, visited: &[SupervisorState]) {
        let policy = self.store.get();
        for state in visited {
            let status = EngineStatus {
                session_active: policy.session_active,
                has_credentials: !policy.credentials.is_empty(),
                supervisor: *state,
            };
            publish(self.bus.as_ref(), event_names::ENGINE_STATUS, &status.to_event());
        }
    }

    /// Walk `Starting -> Running` with the lock held. Falls back to
    /// `Stopped` if the loop fails to come up.
    fn start_locked(&self, core: &mut Core, visited: &mut Vec<SupervisorState>) {
        if core.state == SupervisorState::Running && self.runner.is_running() {
            return;
        }
        core.state = SupervisorState::Starting;
        visited.push(core.state);

        self.runner.start();
        core.state = if self.runner.is_running() {
            SupervisorState::Running
        } else {
            tracing::error!("enforcement loop failed to start");
            SupervisorState::Stopped
        };
        visited.push(core.state);
        tracing::info!(state = %core.state, "supervisor transition");
    }

    fn start(&self) {
        let mut visited = Vec::new();
        {
            let mut core = self.lock();
            // An explicit start supersedes any scheduled restart.
            core.generation += 1;
            core.restart_pending = false;
            self.start_locked(&mut core, &mut visited);
        }
        self.announce(&visited);
    }

    fn stop(&self) {
        let changed = {
            let mut core = self.lock();
            core.generation += 1;
            core.restart_pending = false;
            self.runner.stop();
            let changed = core.state != SupervisorState::Stopped;
            core.state = SupervisorState::Stopped;
            changed
        };
        if changed {
            tracing::info!("supervisor stopped");
            self.announce(&[SupervisorState::Stopped]);
        }
    }

    fn cold_start(self: &Arc<Self>) {
        if self.lock().state != SupervisorState::Stopped {
            return;
        }
        if self.store.session_active() {
            tracing::info!("cold start with active session, resuming enforcement");
            self.start();
        } else {
            tracing::info!("cold start with no active session, staying stopped");
        }
    }

    fn task_removed(self: &Arc<Self>) {
        let generation = {
            let mut core = self.lock();
            if core.state != SupervisorState::Running {
                return;
            }
            self.runner.stop();
            core.state = SupervisorState::Stopped;
            if !self.store.session_active() {
                tracing::info!("task removed with no active session");
                drop(core);
                self.announce(&[SupervisorState::Stopped]);
                return;
            }
            core.restart_pending = true;
            core.generation
        };
        self.announce(&[SupervisorState::Stopped]);

        let weak: Weak<Inner> = Arc::downgrade(self);
        let scheduled = self.scheduler.schedule_one_shot(
            self.restart_delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.deferred_restart(generation);
                }
            }),
        );

        match scheduled {
            Ok(()) => tracing::info!(delay = ?self.restart_delay, "task removed, restart scheduled"),
            Err(e) => {
                tracing::warn!(error = %e, "could not schedule restart, restarting now");
                self.start();
            }
        }
    }

    fn deferred_restart(&self, generation: u64) {
        let mut visited = Vec::new();
        {
            let mut core = self.lock();
            if core.generation != generation || !core.restart_pending {
                tracing::debug!("stale deferred restart ignored");
                return;
            }
            core.restart_pending = false;
            if !self.store.session_active() {
                tracing::info!("session ended before deferred restart");
                return;
            }
            self.start_locked(&mut core, &mut visited);
        }
        self.announce(&visited);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Deferred, ManualScheduler, ScheduleError};
    use focusgate_events::InMemoryEventBus;
    use focusgate_policy::PolicyStore;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeLoop {
        running: AtomicBool,
        starts: AtomicUsize,
        refuse: AtomicBool,
    }

    impl LoopControl for FakeLoop {
        fn start(&self) -> bool {
            if self.refuse.load(Ordering::SeqCst) || self.running.load(Ordering::SeqCst) {
                return false;
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            self.running.store(true, Ordering::SeqCst);
            true
        }

        fn stop(&self) {
            self.running.store(false, Ordering::SeqCst);
        }

        fn is_running(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }
    }

    struct RejectingScheduler;

    impl Scheduler for RejectingScheduler {
        fn schedule_one_shot(&self, _delay: Duration, _task: Deferred) -> Result<(), ScheduleError> {
            Err(ScheduleError::Rejected("quota".into()))
        }
    }

    struct Fixture {
        supervisor: ResilienceSupervisor,
        runner: Arc<FakeLoop>,
        scheduler: Arc<ManualScheduler>,
        store: PolicyStoreRef,
        bus: Arc<InMemoryEventBus>,
    }

    fn fixture(session_active: bool) -> Fixture {
        let store: PolicyStoreRef = Arc::new(PolicyStore::in_memory());
        store.set_session_active(session_active);
        let runner = Arc::new(FakeLoop::default());
        let scheduler = Arc::new(ManualScheduler::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let supervisor = ResilienceSupervisor::builder(Arc::clone(&store), runner.clone())
            .scheduler(scheduler.clone())
            .bus(bus.clone())
            .build();
        Fixture {
            supervisor,
            runner,
            scheduler,
            store,
            bus,
        }
    }

    fn visited(bus: &InMemoryEventBus) -> Vec<String> {
        bus.events_for(event_names::ENGINE_STATUS)
            .iter()
            .map(|e| e.payload["supervisor"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_start_and_stop() {
        let f = fixture(true);
        assert_eq!(f.supervisor.state(), SupervisorState::Stopped);

        assert_eq!(f.supervisor.start(), SupervisorState::Running);
        assert!(f.runner.is_running());
        assert_eq!(visited(&f.bus), vec!["starting", "running"]);

        assert_eq!(f.supervisor.stop(), SupervisorState::Stopped);
        assert!(!f.runner.is_running());
    }

    #[test]
    fn test_start_is_idempotent() {
        let f = fixture(true);
        f.supervisor.start();
        f.supervisor.start();
        assert_eq!(f.runner.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_task_removed_schedules_restart() {
        let f = fixture(true);
        f.supervisor.start();
        f.bus.clear();

        assert_eq!(f.supervisor.task_removed(), SupervisorState::Stopped);
        assert!(!f.runner.is_running());
        assert!(f.supervisor.restart_pending());
        assert_eq!(f.scheduler.pending_delays(), vec![DEFAULT_RESTART_DELAY]);

        f.scheduler.run_pending();
        assert_eq!(f.supervisor.state(), SupervisorState::Running);
        assert!(f.runner.is_running());
        assert_eq!(visited(&f.bus), vec!["stopped", "starting", "running"]);
    }

    #[test]
    fn test_stop_cancels_pending_restart() {
        let f = fixture(true);
        f.supervisor.start();
        f.supervisor.task_removed();
        f.supervisor.stop();

        f.scheduler.run_pending();
        assert_eq!(f.supervisor.state(), SupervisorState::Stopped);
        assert!(!f.runner.is_running());
    }

    #[test]
    fn test_explicit_start_supersedes_earlier_restart() {
        let f = fixture(true);
        f.supervisor.start();
        f.supervisor.task_removed();
        f.supervisor.start();
        f.supervisor.task_removed();
        assert_eq!(f.scheduler.pending_delays().len(), 2);

        // Run only the first, stale restart.
        let (first, second) = {
            let mut tasks = f.scheduler.take_pending();
            let second = tasks.pop();
            (tasks.pop(), second)
        };
        if let Some((_, task)) = first {
            task();
        }
        assert_eq!(f.supervisor.state(), SupervisorState::Stopped);
        assert!(f.supervisor.restart_pending());

        if let Some((_, task)) = second {
            task();
        }
        assert_eq!(f.supervisor.state(), SupervisorState::Running);
    }

    #[test]
    fn test_task_removed_without_session_does_not_restart() {
        let f = fixture(false);
        f.supervisor.start();

        assert_eq!(f.supervisor.task_removed(), SupervisorState::Stopped);
        assert!(f.scheduler.pending_delays().is_empty());
    }

    #[test]
    fn test_session_ended_before_restart() {
        let f = fixture(true);
        f.supervisor.start();
        f.supervisor.task_removed();
        f.store.set_session_active(false);

        f.scheduler.run_pending();
        assert_eq!(f.supervisor.state(), SupervisorState::Stopped);
    }

    #[test]
    fn test_task_removed_while_stopped_is_ignored() {
        let f = fixture(true);
        assert_eq!(f.supervisor.task_removed(), SupervisorState::Stopped);
        assert!(f.scheduler.pending_delays().is_empty());
    }

    #[test]
    fn test_rejected_schedule_restarts_immediately() {
        let store: PolicyStoreRef = Arc::new(PolicyStore::in_memory());
        store.set_session_active(true);
        let runner = Arc::new(FakeLoop::default());
        let supervisor = ResilienceSupervisor::builder(store, runner.clone())
            .scheduler(Arc::new(RejectingScheduler))
            .build();

        supervisor.start();
        assert_eq!(supervisor.task_removed(), SupervisorState::Running);
        assert!(runner.is_running());
    }

    #[test]
    fn test_cold_start_resumes_active_session() {
        let f = fixture(true);
        assert_eq!(f.supervisor.cold_start(), SupervisorState::Running);
    }

    #[test]
    fn test_cold_start_without_session_stays_stopped() {
        let f = fixture(false);
        assert_eq!(f.supervisor.cold_start(), SupervisorState::Stopped);
        assert_eq!(f.runner.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_loop_start_falls_back_to_stopped() {
        let f = fixture(true);
        f.runner.refuse.store(true, Ordering::SeqCst);
        assert_eq!(f.supervisor.start(), SupervisorState::Stopped);
        assert_eq!(visited(&f.bus), vec!["starting", "stopped"]);
    }
}
