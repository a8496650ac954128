//! Policy data model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Platform package identifier of an installed application.
///
/// Equality is exact string match; no case folding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A normalized credential string.
///
/// Construction does not normalize; scans are normalized by the gate before
/// they become a `CredentialId`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(String);

impl CredentialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CredentialId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Snapshot of the enforcement policy.
///
/// Readers take a full clone at the start of their tick or callback and work
/// from that; a concurrent write never shows up half-applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyState {
    pub session_active: bool,
    pub blocked_apps: BTreeSet<AppId>,
    pub credentials: BTreeSet<CredentialId>,
}

impl PolicyState {
    pub fn is_blocked(&self, app_id: &AppId) -> bool {
        self.blocked_apps.contains(app_id)
    }

    pub fn is_registered(&self, credential: &CredentialId) -> bool {
        self.credentials.contains(credential)
    }

    /// Whether a notification or foreground app from `app_id` must be
    /// suppressed right now.
    pub fn enforces(&self, app_id: &AppId) -> bool {
        self.session_active && self.is_blocked(app_id)
    }
}

/// An installed application as listed by the host's package manager.
///
/// The flags default to a plain user-installed app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApp {
    pub id: AppId,
    pub name: String,
    /// Preinstalled as part of the system image.
    #[serde(default)]
    pub is_system: bool,
    /// A system app the user has updated from the store.
    #[serde(default)]
    pub is_updated_system: bool,
    /// Has an activity listed in the launcher.
    #[serde(default)]
    pub has_launcher: bool,
    /// An enabled input method (keyboard).
    #[serde(default)]
    pub is_input_method: bool,
}

impl InstalledApp {
    /// A user-installed app.
    pub fn new(id: impl Into<AppId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_system: false,
            is_updated_system: false,
            has_launcher: false,
            is_input_method: false,
        }
    }

    /// A preinstalled system package with no launcher entry.
    pub fn system(id: impl Into<AppId>, name: impl Into<String>) -> Self {
        Self {
            is_system: true,
            ..Self::new(id, name)
        }
    }

    /// Whether the user would recognise this app in a picker.
    ///
    /// Plain system packages are hidden; system apps stay visible when the
    /// user updated them, can launch them, or types with them.
    pub fn is_user_facing(&self) -> bool {
        !self.is_system || self.is_updated_system || self.has_launcher || self.is_input_method
    }
}

/// Entry of the app picker: an installed app plus its current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockableApp {
    pub id: AppId,
    pub name: String,
    pub selected: bool,
}
