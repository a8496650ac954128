//! Policy store for the focus engine.
//!
//! Holds the three pieces of state every other component reads:
//! - whether a focus session is active
//! - which applications are blocked during a session
//! - which credentials may toggle the session
//!
//! The store is owned explicitly and shared as an `Arc`; readers take full
//! snapshots with [`PolicyStore::get`]. Persistence goes through the
//! [`KeyValueStore`] trait, with a SQLite backend for real hosts and an
//! in-memory one for tests.

mod kv;
mod settings;
mod store;
mod types;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore, StorageError};
pub use settings::{lockable_apps, SettingsEditor, SettingsError};
pub use store::{PolicyStore, PolicyStoreRef};
pub use types::{AppId, CredentialId, InstalledApp, LockableApp, PolicyState};
