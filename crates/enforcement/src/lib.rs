//! Enforcement for the focus engine.
//!
//! The [`EnforcementController`] turns foreground samples into block-screen
//! launches, rate-limited by a cooldown. The [`EnforcementLoop`] runs the
//! poller and controller together on a fixed-period timer thread.
//!
//! # Example
//!
//! ```ignore
//! use focusgate_enforcement::{EnforcementController, EnforcementLoop};
//!
//! let controller = EnforcementController::new(own_app_id, block_screen);
//! let runner = EnforcementLoop::new(store, ForegroundPoller::new(provider), controller);
//! runner.start();
//! ```

mod controller;
mod error;
mod runner;

pub use controller::{
    BlockScreen, BlockScreenRef, Decision, EnforcementController, LaunchRequest, DEFAULT_COOLDOWN,
};
pub use error::LaunchError;
pub use runner::{EnforcementLoop, TickOutcome, DEFAULT_POLL_INTERVAL};

/// Block screen that only logs. Used by hosts without a display surface.
pub struct LoggingBlockScreen;

impl BlockScreen for LoggingBlockScreen {
    fn show(&self, request: &LaunchRequest) -> Result<(), LaunchError> {
        tracing::info!(app_id = %request.app_id, "block screen requested");
        Ok(())
    }
}
