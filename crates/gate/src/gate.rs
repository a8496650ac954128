//! The credential gate: the only path that may toggle a session.

use crate::error::GateError;
use crate::scan::Scan;
use focusgate_events::{
    event_names, publish, CredentialRegisteredEvent, EventBusRef, NullEventBus,
    SessionToggledEvent,
};
use focusgate_policy::{CredentialId, PolicyStoreRef};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Outcome of submitting a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum GateResult {
    /// A registered credential flipped the session flag.
    Toggled { session_active: bool },
    /// The gate was in registration mode and stored the credential.
    Registered,
    /// Unknown credential; nothing changed.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateMode {
    Normal,
    Registering,
}

/// Validates scanned credentials and toggles the session.
///
/// `submit` holds the gate lock for its whole read-modify-write, so two scans
/// arriving together toggle twice rather than racing on one snapshot.
pub struct CredentialGate {
    store: PolicyStoreRef,
    bus: EventBusRef,
    mode: Mutex<GateMode>,
}

impl CredentialGate {
    pub fn new(store: PolicyStoreRef) -> Self {
        Self::with_bus(store, Arc::new(NullEventBus))
    }

    pub fn with_bus(store: PolicyStoreRef, bus: EventBusRef) -> Self {
        Self {
            store,
            bus,
            mode: Mutex::new(GateMode::Normal),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateMode> {
        self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Arm registration: the next submitted credential is added to the set.
    pub fn begin_registration(&self) -> Result<(), GateError> {
        let mut mode = self.lock();
        if self.store.session_active() {
            return Err(GateError::SessionActive);
        }
        *mode = GateMode::Registering;
        tracing::info!("credential registration armed");
        Ok(())
    }

    /// Leave registration mode without registering anything.
    pub fn cancel_registration(&self) {
        let mut mode = self.lock();
        if *mode == GateMode::Registering {
            tracing::debug!("credential registration cancelled");
        }
        *mode = GateMode::Normal;
    }

    pub fn is_registering(&self) -> bool {
        *self.lock() == GateMode::Registering
    }

    /// Normalize a raw scan and submit it.
    ///
    /// A blank scan is rejected and leaves registration mode armed.
    pub fn submit_scan(&self, scan: &Scan) -> GateResult {
        match scan.normalize() {
            Ok(credential) => self.submit(credential),
            Err(e) => {
                tracing::info!(error = %e, "scan rejected");
                GateResult::Rejected
            }
        }
    }

    pub fn submit(&self, credential: CredentialId) -> GateResult {
        let mut mode = self.lock();

        if *mode == GateMode::Registering {
            *mode = GateMode::Normal;
            let added = self.store.add_credential(credential.clone());
            let registered_count = self.store.get().credentials.len();
            tracing::info!(added, registered_count, "credential registered");
            publish(
                self.bus.as_ref(),
                event_names::CREDENTIAL_REGISTERED,
                &CredentialRegisteredEvent {
                    credential: credential.to_string(),
                    registered_count,
                },
            );
            return GateResult::Registered;
        }

        let policy = self.store.get();
        if !policy.is_registered(&credential) {
            tracing::info!("unknown credential");
            return GateResult::Rejected;
        }

        let session_active = !policy.session_active;
        self.store.set_session_active(session_active);
        tracing::info!(session_active, "session toggled");
        publish(
            self.bus.as_ref(),
            event_names::SESSION_TOGGLED,
            &SessionToggledEvent {
                session_active,
                timestamp_ms: chrono::Utc::now().timestamp_millis(),
            },
        );
        GateResult::Toggled { session_active }
    }
}
