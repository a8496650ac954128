//! Notification suppression for the focus engine.
//!
//! Runs on the host's notification-posted callback, independent of the poll
//! loop. Each callback takes its own policy snapshot.

use focusgate_events::{event_names, publish, EventBusRef, NullEventBus, NotificationSuppressedEvent};
use focusgate_policy::{AppId, PolicyStoreRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Failure of a cancel request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CancelError {
    /// The notification-listener grant is missing.
    #[error("notification access not granted")]
    PermissionDenied,

    #[error("cancel failed: {0}")]
    Failed(String),
}

/// The host notification facility.
///
/// Cancelling a key that is no longer posted must succeed as a no-op.
pub trait NotificationCanceller: Send + Sync {
    fn cancel(&self, key: &str) -> Result<(), CancelError>;
}

pub type NotificationCancellerRef = Arc<dyn NotificationCanceller>;

/// Canceller for hosts without a notification facility.
pub struct NullCanceller;

impl NotificationCanceller for NullCanceller {
    fn cancel(&self, key: &str) -> Result<(), CancelError> {
        tracing::debug!(key, "cancel requested with no notification facility");
        Ok(())
    }
}

/// Outcome of one posted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SuppressOutcome {
    /// Left alone: no session, or the source is not blocked.
    Allowed,
    Cancelled,
    CancelFailed { error: String },
}

/// Cancels notifications posted by blocked apps during a session.
pub struct NotificationSuppressor {
    store: PolicyStoreRef,
    canceller: NotificationCancellerRef,
    bus: EventBusRef,
}

impl NotificationSuppressor {
    pub fn new(store: PolicyStoreRef, canceller: NotificationCancellerRef) -> Self {
        Self {
            store,
            canceller,
            bus: Arc::new(NullEventBus),
        }
    }

    pub fn with_bus(mut self, bus: EventBusRef) -> Self {
        self.bus = bus;
        self
    }

    pub fn on_notification_posted(&self, source: &AppId, key: &str) -> SuppressOutcome {
        let policy = self.store.get();
        if !policy.enforces(source) {
            return SuppressOutcome::Allowed;
        }

        match self.canceller.cancel(key) {
            Ok(()) => {
                tracing::debug!(app_id = %source, key, "notification suppressed");
                publish(
                    self.bus.as_ref(),
                    event_names::NOTIFICATION_SUPPRESSED,
                    &NotificationSuppressedEvent {
                        app_id: source.to_string(),
                        key: key.to_string(),
                    },
                );
                SuppressOutcome::Cancelled
            }
            Err(e) => {
                tracing::warn!(app_id = %source, key, error = %e, "failed to cancel notification");
                SuppressOutcome::CancelFailed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focusgate_events::InMemoryEventBus;
    use focusgate_policy::PolicyStore;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Notification shade that behaves like the platform: cancelling a key
    /// that is not posted is a no-op.
    #[derive(Default)]
    struct FakeShade {
        posted: Mutex<HashSet<String>>,
        cancel_calls: Mutex<Vec<String>>,
    }

    impl FakeShade {
        fn post(&self, key: &str) {
            self.posted.lock().unwrap().insert(key.to_string());
        }

        fn is_posted(&self, key: &str) -> bool {
            self.posted.lock().unwrap().contains(key)
        }
    }

    impl NotificationCanceller for FakeShade {
        fn cancel(&self, key: &str) -> Result<(), CancelError> {
            self.cancel_calls.lock().unwrap().push(key.to_string());
            self.posted.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct DeniedShade;

    impl NotificationCanceller for DeniedShade {
        fn cancel(&self, _key: &str) -> Result<(), CancelError> {
            Err(CancelError::PermissionDenied)
        }
    }

    fn store(active: bool) -> PolicyStoreRef {
        let store = Arc::new(PolicyStore::in_memory());
        store.set_blocked_apps([AppId::new("com.x.games")]);
        store.set_session_active(active);
        store
    }

    #[test]
    fn test_blocked_app_notification_cancelled() {
        let shade = Arc::new(FakeShade::default());
        shade.post("k1");
        let suppressor = NotificationSuppressor::new(store(true), shade.clone());

        let outcome = suppressor.on_notification_posted(&AppId::new("com.x.games"), "k1");
        assert_eq!(outcome, SuppressOutcome::Cancelled);
        assert!(!shade.is_posted("k1"));
    }

    #[test]
    fn test_inactive_session_allows_everything() {
        let shade = Arc::new(FakeShade::default());
        let suppressor = NotificationSuppressor::new(store(false), shade.clone());

        let outcome = suppressor.on_notification_posted(&AppId::new("com.x.games"), "k1");
        assert_eq!(outcome, SuppressOutcome::Allowed);
        assert!(shade.cancel_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unblocked_source_allowed() {
        let shade = Arc::new(FakeShade::default());
        let suppressor = NotificationSuppressor::new(store(true), shade.clone());

        let outcome = suppressor.on_notification_posted(&AppId::new("com.mail"), "k1");
        assert_eq!(outcome, SuppressOutcome::Allowed);
    }

    #[test]
    fn test_cancel_twice_is_not_an_error() {
        let shade = Arc::new(FakeShade::default());
        shade.post("k1");
        let suppressor = NotificationSuppressor::new(store(true), shade.clone());
        let source = AppId::new("com.x.games");

        assert_eq!(suppressor.on_notification_posted(&source, "k1"), SuppressOutcome::Cancelled);
        assert_eq!(suppressor.on_notification_posted(&source, "k1"), SuppressOutcome::Cancelled);
        assert_eq!(shade.cancel_calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_permission_denied_is_contained() {
        let suppressor = NotificationSuppressor::new(store(true), Arc::new(DeniedShade));

        let outcome = suppressor.on_notification_posted(&AppId::new("com.x.games"), "k1");
        assert!(matches!(outcome, SuppressOutcome::CancelFailed { .. }));
    }

    #[test]
    fn test_suppression_publishes_event() {
        let bus = Arc::new(InMemoryEventBus::new());
        let suppressor =
            NotificationSuppressor::new(store(true), Arc::new(FakeShade::default())).with_bus(bus.clone());

        suppressor.on_notification_posted(&AppId::new("com.x.games"), "k9");

        let events = bus.events_for(event_names::NOTIFICATION_SUPPRESSED);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["key"], "k9");
    }
}
