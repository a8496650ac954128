//! Settings-side mutations, locked while a session is active.

use crate::store::PolicyStoreRef;
use crate::types::{AppId, CredentialId, InstalledApp, LockableApp};
use std::collections::HashSet;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings are locked while a focus session is active")]
    SessionActive,
}

/// Entry point for the settings UI.
///
/// Edits that would weaken the policy are refused mid-session; the user has
/// to end the session with a registered credential first.
#[derive(Clone)]
pub struct SettingsEditor {
    store: PolicyStoreRef,
}

impl SettingsEditor {
    pub fn new(store: PolicyStoreRef) -> Self {
        Self { store }
    }

    fn ensure_unlocked(&self) -> Result<(), SettingsError> {
        if self.store.session_active() {
            tracing::info!("settings edit refused during active session");
            return Err(SettingsError::SessionActive);
        }
        Ok(())
    }

    pub fn set_blocked_apps<I>(&self, apps: I) -> Result<(), SettingsError>
    where
        I: IntoIterator<Item = AppId>,
    {
        self.ensure_unlocked()?;
        self.store.set_blocked_apps(apps);
        Ok(())
    }

    /// Forget a credential. Returns whether it was registered.
    pub fn remove_credential(&self, id: &CredentialId) -> Result<bool, SettingsError> {
        self.ensure_unlocked()?;
        Ok(self.store.remove_credential(id))
    }

    /// Build the app picker list from the installed apps.
    pub fn lockable_apps(&self, installed: Vec<InstalledApp>, own_app_id: &AppId) -> Vec<LockableApp> {
        let blocked = self.store.get().blocked_apps;
        lockable_apps(installed, own_app_id, |id| blocked.contains(id))
    }
}

/// Every user-facing installed app except our own, sorted by display name.
///
/// A package listed more than once keeps its first entry.
pub fn lockable_apps<F>(installed: Vec<InstalledApp>, own_app_id: &AppId, is_selected: F) -> Vec<LockableApp>
where
    F: Fn(&AppId) -> bool,
{
    let mut seen = HashSet::new();
    let mut apps: Vec<LockableApp> = installed
        .into_iter()
        .filter(|app| &app.id != own_app_id && app.is_user_facing())
        .filter(|app| seen.insert(app.id.clone()))
        .map(|app| LockableApp {
            selected: is_selected(&app.id),
            id: app.id,
            name: app.name,
        })
        .collect();
    apps.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    apps
}
