//! Resilience supervision for the focus engine.
//!
//! The host may kill the enforcement loop at any time (task removal, memory
//! pressure, reboot). The [`ResilienceSupervisor`] owns the loop's lifecycle
//! and brings it back whenever a session is still active.
//!
//! ```text
//!   Start / ColdStart(active)        loop up
//!   Stopped ───────────────▶ Starting ───────▶ Running
//!      ▲                                          │
//!      └──────── Stop / TaskRemoved ──────────────┘
//!                       │ session active
//!                       ▼
//!              deferred restart (Scheduler)
//! ```

mod scheduler;
mod status;
mod supervisor;

pub use scheduler::{Deferred, ManualScheduler, ScheduleError, Scheduler, ThreadScheduler};
pub use status::{EngineStatus, SupervisorState};
pub use supervisor::{
    LoopControl, ResilienceSupervisor, Signal, SupervisorBuilder, DEFAULT_RESTART_DELAY,
};
