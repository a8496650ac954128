//! Provider trait for the host's usage-tracking facility.
//!
//! This abstracts the platform implementation so the resolution logic stays
//! pure and testable.

use crate::state::UsageEvent;
use focusgate_policy::AppId;
use std::collections::HashMap;
use std::sync::Arc;

/// Failure of a usage-tracking query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The usage-access grant is missing.
    #[error("usage access not granted")]
    PermissionDenied,

    /// The facility failed or timed out.
    #[error("usage query unavailable: {0}")]
    Unavailable(String),
}

/// Host usage-tracking facility.
///
/// Both queries are bounded-latency local calls over the half-open window
/// `[start_ms, end_ms)`.
pub trait UsageStatsProvider: Send + Sync {
    /// Foreground-transition events in the window, in the order reported.
    fn query_foreground_events(&self, start_ms: i64, end_ms: i64)
        -> Result<Vec<UsageEvent>, QueryError>;

    /// Last-used timestamp per app, aggregated over the window.
    fn query_aggregate_usage(&self, start_ms: i64, end_ms: i64)
        -> Result<HashMap<AppId, i64>, QueryError>;
}

/// Shared provider reference.
pub type UsageStatsProviderRef = Arc<dyn UsageStatsProvider>;

/// Null implementation for hosts without a usage-tracking facility.
///
/// Every tick resolves to "no foreground app".
pub struct NullUsageProvider;

impl UsageStatsProvider for NullUsageProvider {
    fn query_foreground_events(&self, _start_ms: i64, _end_ms: i64) -> Result<Vec<UsageEvent>, QueryError> {
        Ok(Vec::new())
    }

    fn query_aggregate_usage(&self, _start_ms: i64, _end_ms: i64) -> Result<HashMap<AppId, i64>, QueryError> {
        Ok(HashMap::new())
    }
}
