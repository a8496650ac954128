//! Foreground-app detection for the focus engine.
//!
//! The host OS reports app usage with latency and sometimes not at all, so
//! detection works in two steps: the last "moved to foreground" transition
//! in a trailing window, and failing that the most recently used app from
//! aggregate statistics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  resolve.rs  - foreground resolution (pure)                  │
//! │  state.rs    - UsageEvent, ForegroundSample                  │
//! │  provider.rs - trait for the usage-tracking facility         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  poller.rs - per-tick sampling, gated on the session flag    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod poller;
mod provider;
mod resolve;
mod state;

pub use poller::{ForegroundPoller, DEFAULT_QUERY_WINDOW};
pub use provider::{NullUsageProvider, QueryError, UsageStatsProvider, UsageStatsProviderRef};
pub use resolve::{last_foreground, most_recently_used};
pub use state::{ForegroundSample, SampleSource, UsageEvent, UsageEventKind};
