//! Focus engine: wires the policy store, credential gate, foreground poller,
//! enforcement controller, notification suppressor and resilience supervisor
//! behind one facade.
//!
//! # Architecture
//!
//! ```text
//!   scan ──▶ CredentialGate ──▶ PolicyStore ◀── SettingsEditor
//!                 │ toggled        ▲   ▲
//!                 ▼                │   │
//!        ResilienceSupervisor      │   └── NotificationSuppressor ◀── posted
//!                 │ start/stop     │
//!                 ▼                │
//!          EnforcementLoop ── ForegroundPoller ──▶ EnforcementController ──▶ BlockScreen
//! ```
//!
//! Hosts supply the OS-facing collaborators through [`Platform`].

mod config;
mod engine;
mod error;

pub use config::{default_config_path, default_database_path, ConfigError, EngineConfig};
pub use engine::{FocusEngine, Platform};
pub use error::{EngineError, Result};

pub use focusgate_enforcement::{BlockScreen, Decision, LaunchError, LaunchRequest, TickOutcome};
pub use focusgate_foreground::{QueryError, UsageEvent, UsageStatsProvider};
pub use focusgate_gate::{CredentialKind, GateResult, Scan};
pub use focusgate_notify::{CancelError, NotificationCanceller, SuppressOutcome};
pub use focusgate_policy::{AppId, CredentialId, InstalledApp, LockableApp, PolicyState};
pub use focusgate_supervisor::{EngineStatus, ManualScheduler, Scheduler, SupervisorState};
