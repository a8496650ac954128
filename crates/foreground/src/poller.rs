//! Foreground poller - samples the foreground app once per tick.

use crate::provider::{QueryError, UsageStatsProviderRef};
use crate::resolve::{last_foreground, most_recently_used};
use crate::state::{ForegroundSample, SampleSource};
use focusgate_policy::PolicyState;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default trailing window queried each tick.
pub const DEFAULT_QUERY_WINDOW: Duration = Duration::from_secs(5);

/// Log every Nth consecutive query failure after the first.
const FAILURE_LOG_EVERY: u64 = 50;

/// Determines the current foreground app from the usage-tracking facility.
///
/// Holds no per-tick state beyond a failure counter used to keep a missing
/// permission from flooding the log.
pub struct ForegroundPoller {
    provider: UsageStatsProviderRef,
    window: Duration,
    consecutive_failures: AtomicU64,
}

impl ForegroundPoller {
    pub fn new(provider: UsageStatsProviderRef) -> Self {
        Self::with_window(provider, DEFAULT_QUERY_WINDOW)
    }

    pub fn with_window(provider: UsageStatsProviderRef, window: Duration) -> Self {
        Self {
            provider,
            window,
            consecutive_failures: AtomicU64::new(0),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Sample the foreground app at `now_ms`.
    ///
    /// Returns `None` without touching the provider when no session is
    /// active. Otherwise the last foreground transition in the window wins;
    /// if the window has none, the most recently used app from aggregate
    /// statistics is taken. A failed query yields `None` for this tick.
    pub fn poll(&self, policy: &PolicyState, now_ms: i64) -> Option<ForegroundSample> {
        if !policy.session_active {
            return None;
        }

        let window_ms = i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX);
        let start_ms = now_ms.saturating_sub(window_ms);

        let events = match self.provider.query_foreground_events(start_ms, now_ms) {
            Ok(events) => events,
            Err(e) => {
                self.record_failure(&e);
                return None;
            }
        };

        if let Some(app_id) = last_foreground(&events) {
            self.clear_failures();
            return Some(ForegroundSample {
                app_id: app_id.clone(),
                observed_at_ms: now_ms,
                source: SampleSource::TransitionEvent,
            });
        }

        let usage = match self.provider.query_aggregate_usage(start_ms, now_ms) {
            Ok(usage) => usage,
            Err(e) => {
                self.record_failure(&e);
                return None;
            }
        };
        self.clear_failures();

        let sample = most_recently_used(&usage).map(|app_id| ForegroundSample {
            app_id: app_id.clone(),
            observed_at_ms: now_ms,
            source: SampleSource::AggregateUsage,
        });

        if sample.is_none() {
            tracing::trace!("foreground app indeterminate");
        }
        sample
    }

    fn record_failure(&self, error: &QueryError) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures == 1 || failures % FAILURE_LOG_EVERY == 0 {
            tracing::warn!(failures, error = %error, "foreground query failed, skipping tick");
        }
    }

    fn clear_failures(&self) {
        let previous = self.consecutive_failures.swap(0, Ordering::Relaxed);
        if previous > 0 {
            tracing::info!(previous, "foreground query recovered");
        }
    }
}
