//! The policy store: in-memory authority backed by best-effort persistence.

use crate::kv::{KeyValueStore, MemoryStore};
use crate::types::{AppId, CredentialId, PolicyState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

const KEY_SESSION_ACTIVE: &str = "session_active";
const KEY_BLOCKED_APPS: &str = "blocked_apps";
const KEY_CREDENTIALS: &str = "credentials";
const KEY_ONBOARDING_COMPLETE: &str = "onboarding_complete";

/// Shared policy store handle.
pub type PolicyStoreRef = Arc<PolicyStore>;

/// Process-wide policy state.
///
/// Every setter updates the in-memory value first and then persists that one
/// field. A failed write is logged and the in-memory value stays; the store is
/// durable on a best-effort basis, not transactional.
pub struct PolicyStore {
    backend: Arc<dyn KeyValueStore>,
    state: RwLock<PolicyState>,
    onboarding_complete: AtomicBool,
}

impl PolicyStore {
    /// Load the policy from `backend`, falling back to defaults for any key
    /// that is missing, unreadable or corrupt.
    pub fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        let state = PolicyState {
            session_active: load(backend.as_ref(), KEY_SESSION_ACTIVE),
            blocked_apps: load(backend.as_ref(), KEY_BLOCKED_APPS),
            credentials: load(backend.as_ref(), KEY_CREDENTIALS),
        };
        let onboarding_complete = load(backend.as_ref(), KEY_ONBOARDING_COMPLETE);

        tracing::debug!(
            session_active = state.session_active,
            blocked_apps = state.blocked_apps.len(),
            credentials = state.credentials.len(),
            "policy loaded"
        );

        Self {
            backend,
            state: RwLock::new(state),
            onboarding_complete: AtomicBool::new(onboarding_complete),
        }
    }

    /// Store with no durable backing.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStore::new()))
    }

    fn read(&self) -> RwLockReadGuard<'_, PolicyState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, PolicyState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current policy. Always succeeds.
    pub fn get(&self) -> PolicyState {
        self.read().clone()
    }

    pub fn session_active(&self) -> bool {
        self.read().session_active
    }

    pub fn set_session_active(&self, active: bool) {
        let mut state = self.write();
        state.session_active = active;
        self.persist(KEY_SESSION_ACTIVE, &state.session_active);
    }

    /// Add `id` to the registered set. Returns false if it was already there.
    pub fn add_credential(&self, id: CredentialId) -> bool {
        let mut state = self.write();
        let added = state.credentials.insert(id);
        if added {
            self.persist(KEY_CREDENTIALS, &state.credentials);
        }
        added
    }

    /// Remove `id` from the registered set. Returns false if it was unknown.
    pub fn remove_credential(&self, id: &CredentialId) -> bool {
        let mut state = self.write();
        let removed = state.credentials.remove(id);
        if removed {
            self.persist(KEY_CREDENTIALS, &state.credentials);
        }
        removed
    }

    /// Replace the blocked set wholesale.
    pub fn set_blocked_apps<I>(&self, apps: I)
    where
        I: IntoIterator<Item = AppId>,
    {
        let apps: BTreeSet<AppId> = apps.into_iter().collect();
        let mut state = self.write();
        state.blocked_apps = apps;
        self.persist(KEY_BLOCKED_APPS, &state.blocked_apps);
    }

    pub fn is_first_run(&self) -> bool {
        !self.onboarding_complete.load(Ordering::SeqCst)
    }

    pub fn complete_onboarding(&self) {
        self.set_onboarding(true);
    }

    pub fn reset_onboarding(&self) {
        self.set_onboarding(false);
    }

    fn set_onboarding(&self, complete: bool) {
        self.onboarding_complete.store(complete, Ordering::SeqCst);
        self.persist(KEY_ONBOARDING_COMPLETE, &complete);
    }

    // Called with the state write guard held so persisted order matches
    // in-memory order.
    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to encode policy field");
                return;
            }
        };
        if let Err(e) = self.backend.set(key, &encoded) {
            tracing::warn!(key, error = %e, "policy write failed, keeping in-memory value");
        }
    }
}

fn load<T: DeserializeOwned + Default>(backend: &dyn KeyValueStore, key: &str) -> T {
    match backend.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "corrupt policy field, using default");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read policy field, using default");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{Result as KvResult, StorageError};

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> KvResult<Option<String>> {
            Err(StorageError::Unavailable("disk gone".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> KvResult<()> {
            Err(StorageError::Unavailable("disk gone".into()))
        }
    }

    #[test]
    fn test_fresh_store_has_defaults() {
        let store = PolicyStore::in_memory();
        assert_eq!(store.get(), PolicyState::default());
        assert!(store.is_first_run());
    }

    #[test]
    fn test_credentials_are_a_set() {
        let store = PolicyStore::in_memory();
        assert!(store.add_credential(CredentialId::new("04a1b2c3")));
        assert!(!store.add_credential(CredentialId::new("04a1b2c3")));
        assert!(store.add_credential(CredentialId::new("qr-payload")));
        assert_eq!(store.get().credentials.len(), 2);
    }

    #[test]
    fn test_remove_unknown_credential() {
        let store = PolicyStore::in_memory();
        assert!(!store.remove_credential(&CredentialId::new("missing")));
    }

    #[test]
    fn test_blocked_apps_deduplicate() {
        let store = PolicyStore::in_memory();
        store.set_blocked_apps(vec![
            AppId::new("com.x.games"),
            AppId::new("com.x.games"),
            AppId::new("com.y.social"),
        ]);
        assert_eq!(store.get().blocked_apps.len(), 2);
    }

    #[test]
    fn test_values_reload_from_backend() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let store = PolicyStore::open(Arc::clone(&backend));
            store.set_session_active(true);
            store.add_credential(CredentialId::new("04a1b2c3"));
            store.set_blocked_apps([AppId::new("com.x.games")]);
            store.complete_onboarding();
        }

        let reopened = PolicyStore::open(backend);
        let state = reopened.get();
        assert!(state.session_active);
        assert!(state.is_registered(&CredentialId::new("04a1b2c3")));
        assert!(state.is_blocked(&AppId::new("com.x.games")));
        assert!(!reopened.is_first_run());
    }

    #[test]
    fn test_write_failure_keeps_in_memory_value() {
        let store = PolicyStore::open(Arc::new(FailingStore));
        assert!(!store.session_active());

        store.set_session_active(true);
        store.add_credential(CredentialId::new("04a1b2c3"));

        assert!(store.session_active());
        assert_eq!(store.get().credentials.len(), 1);
    }

    #[test]
    fn test_corrupt_value_reads_as_default() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(KEY_BLOCKED_APPS, "not json").unwrap();
        backend.set(KEY_SESSION_ACTIVE, "true").unwrap();

        let store = PolicyStore::open(backend);
        let state = store.get();
        assert!(state.blocked_apps.is_empty());
        assert!(state.session_active);
    }
}
