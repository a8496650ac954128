//! Error types for the credential gate.

use thiserror::Error;

/// A scan that cannot become a credential.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("scan payload is empty")]
    Empty,
}

/// Requests the gate refuses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    /// Registration is only possible while no session is active.
    #[error("cannot register credentials during an active focus session")]
    SessionActive,
}
