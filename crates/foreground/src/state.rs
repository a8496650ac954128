//! Usage-tracking records and the per-tick foreground sample.

use focusgate_policy::AppId;
use serde::{Deserialize, Serialize};

/// Kind of a usage-tracking event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageEventKind {
    MovedToForeground,
    MovedToBackground,
    /// Any other event type the platform reports (configuration change,
    /// standby bucket change, ...). Ignored by the resolver.
    Other,
}

/// One foreground-transition record from the usage-tracking facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub app_id: AppId,
    pub kind: UsageEventKind,
    pub timestamp_ms: i64,
}

impl UsageEvent {
    pub fn foreground(app_id: impl Into<AppId>, timestamp_ms: i64) -> Self {
        Self {
            app_id: app_id.into(),
            kind: UsageEventKind::MovedToForeground,
            timestamp_ms,
        }
    }

    pub fn background(app_id: impl Into<AppId>, timestamp_ms: i64) -> Self {
        Self {
            app_id: app_id.into(),
            kind: UsageEventKind::MovedToBackground,
            timestamp_ms,
        }
    }
}

/// How the foreground app of a sample was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    /// Last foreground-transition event in the window.
    TransitionEvent,
    /// Most recently used app from aggregate statistics.
    AggregateUsage,
}

/// The foreground app observed during one poll tick. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForegroundSample {
    pub app_id: AppId,
    pub observed_at_ms: i64,
    pub source: SampleSource,
}
