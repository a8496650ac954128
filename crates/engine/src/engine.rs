//! The focus engine facade.

use crate::config::EngineConfig;
use crate::error::Result;
use focusgate_enforcement::{BlockScreenRef, EnforcementController, EnforcementLoop, LoggingBlockScreen, TickOutcome};
use focusgate_events::{EventBusRef, NullEventBus};
use focusgate_foreground::{ForegroundPoller, NullUsageProvider, UsageStatsProviderRef};
use focusgate_gate::{CredentialGate, GateResult, Scan};
use focusgate_notify::{NotificationCancellerRef, NotificationSuppressor, NullCanceller, SuppressOutcome};
use focusgate_policy::{AppId, CredentialId, PolicyStore, PolicyStoreRef, SettingsEditor, SqliteStore};
use focusgate_supervisor::{
    EngineStatus, LoopControl, ResilienceSupervisor, Scheduler, SupervisorState, ThreadScheduler,
};
use std::sync::Arc;

/// Host-provided collaborators.
#[derive(Clone)]
pub struct Platform {
    pub usage: UsageStatsProviderRef,
    pub block_screen: BlockScreenRef,
    pub canceller: NotificationCancellerRef,
    pub scheduler: Arc<dyn Scheduler>,
    pub bus: EventBusRef,
}

impl Platform {
    /// Collaborators for a host with no OS integration: nothing is ever
    /// observed in the foreground and blocks are only logged.
    pub fn headless() -> Self {
        Self {
            usage: Arc::new(NullUsageProvider),
            block_screen: Arc::new(LoggingBlockScreen),
            canceller: Arc::new(NullCanceller),
            scheduler: Arc::new(ThreadScheduler),
            bus: Arc::new(NullEventBus),
        }
    }
}

/// Single entry point for hosts.
///
/// Owns the policy store and every component built on it. Host callbacks
/// (scans, posted notifications, task removal, process start) map one-to-one
/// onto methods here.
pub struct FocusEngine {
    config: EngineConfig,
    store: PolicyStoreRef,
    gate: CredentialGate,
    suppressor: NotificationSuppressor,
    runner: Arc<EnforcementLoop>,
    supervisor: ResilienceSupervisor,
}

impl FocusEngine {
    /// Open the SQLite policy store named by `config` and wire the engine.
    pub fn open(config: EngineConfig, platform: Platform) -> Result<Self> {
        config.validate()?;
        let path = config.database_path()?;
        let backend = SqliteStore::open(&path)?;
        tracing::info!(path = %path.display(), "policy database opened");
        let store = Arc::new(PolicyStore::open(Arc::new(backend)));
        Self::new(config, store, platform)
    }

    pub fn new(config: EngineConfig, store: PolicyStoreRef, platform: Platform) -> Result<Self> {
        config.validate()?;

        let gate = CredentialGate::with_bus(Arc::clone(&store), platform.bus.clone());
        let suppressor = NotificationSuppressor::new(Arc::clone(&store), platform.canceller)
            .with_bus(platform.bus.clone());

        let poller = ForegroundPoller::with_window(platform.usage, config.query_window());
        let controller = EnforcementController::new(AppId::new(config.own_app_id.clone()), platform.block_screen)
            .with_cooldown(config.cooldown())
            .with_bus(platform.bus.clone());
        let runner = Arc::new(
            EnforcementLoop::new(Arc::clone(&store), poller, controller).with_interval(config.poll_interval()),
        );

        let supervisor = ResilienceSupervisor::builder(Arc::clone(&store), runner.clone() as Arc<dyn LoopControl>)
            .scheduler(platform.scheduler)
            .restart_delay(config.restart_delay())
            .bus(platform.bus)
            .build();

        Ok(Self {
            config,
            store,
            gate,
            suppressor,
            runner,
            supervisor,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &PolicyStoreRef {
        &self.store
    }

    pub fn submit_scan(&self, scan: &Scan) -> GateResult {
        let result = self.gate.submit_scan(scan);
        self.after_gate(result);
        result
    }

    pub fn submit_credential(&self, credential: CredentialId) -> GateResult {
        let result = self.gate.submit(credential);
        self.after_gate(result);
        result
    }

    fn after_gate(&self, result: GateResult) {
        match result {
            GateResult::Toggled { session_active: true }
                if self.supervisor.state() != SupervisorState::Running =>
            {
                self.supervisor.start();
            }
            // Deactivation leaves the loop idling; only the status changes.
            GateResult::Toggled { .. } | GateResult::Registered => self.supervisor.announce(),
            GateResult::Rejected => {}
        }
    }

    pub fn begin_registration(&self) -> Result<()> {
        Ok(self.gate.begin_registration()?)
    }

    pub fn cancel_registration(&self) {
        self.gate.cancel_registration();
    }

    pub fn is_registering(&self) -> bool {
        self.gate.is_registering()
    }

    pub fn on_notification_posted(&self, source: &AppId, key: &str) -> SuppressOutcome {
        self.suppressor.on_notification_posted(source, key)
    }

    pub fn on_task_removed(&self) -> SupervisorState {
        self.supervisor.task_removed()
    }

    pub fn cold_start(&self) -> SupervisorState {
        self.supervisor.cold_start()
    }

    pub fn start(&self) -> SupervisorState {
        self.supervisor.start()
    }

    pub fn stop(&self) -> SupervisorState {
        self.supervisor.stop()
    }

    pub fn status(&self) -> EngineStatus {
        self.supervisor.status()
    }

    pub fn settings(&self) -> SettingsEditor {
        SettingsEditor::new(Arc::clone(&self.store))
    }

    /// Run one enforcement tick synchronously, outside the timer thread.
    pub fn tick_at(&self, now_ms: i64) -> TickOutcome {
        self.runner.tick_at(now_ms)
    }
}

impl Drop for FocusEngine {
    fn drop(&mut self) {
        self.supervisor.stop();
    }
}
