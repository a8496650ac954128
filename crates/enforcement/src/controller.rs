//! Enforcement controller - decides whether a sample warrants interruption.

use crate::error::LaunchError;
use focusgate_events::{event_names, publish, BlockShownEvent, EventBusRef, NullEventBus};
use focusgate_foreground::ForegroundSample;
use focusgate_policy::{AppId, PolicyState};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Default minimum interval between two block-screen launches.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1500);

/// How the block screen must be presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Blocked app that was observed in the foreground.
    pub app_id: AppId,
    /// Raise above every other activity.
    pub bring_to_front: bool,
    pub animated: bool,
    /// Collapse onto an existing instance instead of stacking a new one.
    pub single_instance: bool,
}

impl LaunchRequest {
    pub fn for_app(app_id: AppId) -> Self {
        Self {
            app_id,
            bring_to_front: true,
            animated: false,
            single_instance: true,
        }
    }
}

/// The block-screen collaborator.
///
/// Fire-and-forget: once shown, the screen offers no in-app dismissal and
/// routes back-navigation to the home screen. That behavior belongs to the
/// implementation, not the controller.
pub trait BlockScreen: Send + Sync {
    fn show(&self, request: &LaunchRequest) -> Result<(), LaunchError>;
}

pub type BlockScreenRef = Arc<dyn BlockScreen>;

/// Outcome of evaluating one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    SessionInactive,
    OwnApp,
    NotBlocked,
    /// A launch happened less than the cooldown ago.
    CoolingDown { remaining_ms: i64 },
    Shown,
    /// The launch failed; the cooldown was not consumed.
    LaunchFailed { error: String },
}

/// Turns foreground samples into block-screen launches.
///
/// Keeps only the time of the last launch. A single switch to a blocked app
/// is usually observed over several consecutive ticks, so launches inside the
/// cooldown are suppressed.
pub struct EnforcementController {
    own_app_id: AppId,
    cooldown: Duration,
    block_screen: BlockScreenRef,
    bus: EventBusRef,
    last_triggered_ms: Mutex<Option<i64>>,
}

impl EnforcementController {
    pub fn new(own_app_id: AppId, block_screen: BlockScreenRef) -> Self {
        Self {
            own_app_id,
            cooldown: DEFAULT_COOLDOWN,
            block_screen,
            bus: Arc::new(NullEventBus),
            last_triggered_ms: Mutex::new(None),
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_bus(mut self, bus: EventBusRef) -> Self {
        self.bus = bus;
        self
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_triggered_ms(&self) -> Option<i64> {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, Option<i64>> {
        self.last_triggered_ms.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn on_sample(&self, policy: &PolicyState, sample: &ForegroundSample, now_ms: i64) -> Decision {
        if !policy.session_active {
            return Decision::SessionInactive;
        }
        if sample.app_id == self.own_app_id {
            return Decision::OwnApp;
        }
        if !policy.is_blocked(&sample.app_id) {
            return Decision::NotBlocked;
        }

        let cooldown_ms = i64::try_from(self.cooldown.as_millis()).unwrap_or(i64::MAX);
        let mut last = self.lock();

        // A clock that stepped backwards counts as an expired cooldown.
        if let Some(last_ms) = *last {
            let elapsed = now_ms - last_ms;
            if (0..cooldown_ms).contains(&elapsed) {
                tracing::trace!(app_id = %sample.app_id, elapsed, "block suppressed by cooldown");
                return Decision::CoolingDown {
                    remaining_ms: cooldown_ms - elapsed,
                };
            }
        }

        let previous = last.replace(now_ms);
        let request = LaunchRequest::for_app(sample.app_id.clone());

        match self.block_screen.show(&request) {
            Ok(()) => {
                drop(last);
                tracing::info!(app_id = %sample.app_id, "block screen shown");
                publish(
                    self.bus.as_ref(),
                    event_names::BLOCK_SHOWN,
                    &BlockShownEvent {
                        app_id: sample.app_id.to_string(),
                        triggered_at_ms: now_ms,
                    },
                );
                Decision::Shown
            }
            Err(e) => {
                *last = previous;
                tracing::warn!(app_id = %sample.app_id, error = %e, "block screen launch failed");
                Decision::LaunchFailed {
                    error: e.to_string(),
                }
            }
        }
    }
}
