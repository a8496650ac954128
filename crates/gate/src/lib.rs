//! Credential gate for the focus engine.
//!
//! A session can only be switched on or off by presenting a registered
//! physical credential: an NFC tag or a QR code. Both sources arrive here as
//! a [`Scan`], are normalized into a `CredentialId`, and are checked against
//! the registered set in the policy store.
//!
//! # Example
//!
//! ```ignore
//! use focusgate_gate::{CredentialGate, GateResult, Scan};
//!
//! let gate = CredentialGate::new(store);
//! match gate.submit_scan(&Scan::Tag(uid)) {
//!     GateResult::Toggled { session_active } => supervisor_start_if(session_active),
//!     GateResult::Registered => {}
//!     GateResult::Rejected => show_unknown_key(),
//! }
//! ```

mod error;
mod gate;
mod scan;

pub use error::{CredentialError, GateError};
pub use gate::{CredentialGate, GateResult};
pub use scan::{CredentialKind, Scan, MAX_TAG_HEX_LEN};
