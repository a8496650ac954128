//! Shared event contracts for the focus engine.
//!
//! This crate defines the DTOs for events that flow from engine components
//! to whoever hosts them. Using shared types keeps producers and consumers
//! agreeing on field names.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{publish, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};

use serde::{Deserialize, Serialize};

/// Event emitted when a credential scan flips the session flag.
///
/// Producers: credential gate
/// Consumers: host status indicator, supervisor wiring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToggledEvent {
    /// Session flag after the toggle.
    pub session_active: bool,
    /// Timestamp in milliseconds since epoch.
    pub timestamp_ms: i64,
}

/// Event emitted when a new credential is registered.
///
/// Producers: credential gate
/// Consumers: settings UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRegisteredEvent {
    /// Normalized credential.
    pub credential: String,
    /// Number of credentials registered after this one was added.
    pub registered_count: usize,
}

/// Event emitted when the block screen is launched over a blocked app.
///
/// Producers: enforcement controller
/// Consumers: host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockShownEvent {
    /// The blocked application that was in the foreground.
    pub app_id: String,
    /// Timestamp in milliseconds since epoch.
    pub triggered_at_ms: i64,
}

/// Event emitted when a notification from a blocked app is cancelled.
///
/// Producers: notification suppressor
/// Consumers: host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSuppressedEvent {
    pub app_id: String,
    pub key: String,
}

/// Event emitted whenever the engine's status line changes.
///
/// Producers: supervisor, engine facade
/// Consumers: host status indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatusEvent {
    pub session_active: bool,
    pub has_credentials: bool,
    /// Supervisor state label ("stopped", "starting", "running").
    pub supervisor: String,
    pub title: String,
    pub detail: String,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    pub const SESSION_TOGGLED: &str = "session:toggled";
    pub const CREDENTIAL_REGISTERED: &str = "credentials:registered";
    pub const BLOCK_SHOWN: &str = "enforcement:block_shown";
    pub const NOTIFICATION_SUPPRESSED: &str = "notifications:suppressed";
    pub const ENGINE_STATUS: &str = "supervisor:status";
}
