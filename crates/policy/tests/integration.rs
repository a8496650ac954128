//! Integration tests for the policy store over SQLite.

use focusgate_policy::{AppId, CredentialId, KeyValueStore, PolicyStore, SqliteStore};
use std::sync::Arc;
use tempfile::tempdir;

fn open_store(path: &std::path::Path) -> PolicyStore {
    let backend = SqliteStore::open(path).expect("Failed to open sqlite store");
    PolicyStore::open(Arc::new(backend))
}

// =============================================================================
// Persistence Tests
// =============================================================================

mod persistence {
    use super::*;

    #[test]
    fn test_open_creates_database_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("policy.db");

        let _store = open_store(&db_path);
        assert!(db_path.exists(), "Database file should exist");
    }

    #[test]
    fn test_policy_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("policy.db");

        {
            let store = open_store(&db_path);
            store.add_credential(CredentialId::new("04a1b2c3"));
            store.add_credential(CredentialId::new("https://example.org/key"));
            store.set_blocked_apps([AppId::new("com.x.games"), AppId::new("com.y.social")]);
            store.set_session_active(true);
        }

        let store = open_store(&db_path);
        let state = store.get();
        assert!(state.session_active, "Session flag should persist");
        assert_eq!(state.credentials.len(), 2);
        assert_eq!(state.blocked_apps.len(), 2);
    }

    #[test]
    fn test_removed_credential_stays_removed() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("policy.db");

        {
            let store = open_store(&db_path);
            store.add_credential(CredentialId::new("aa"));
            store.add_credential(CredentialId::new("bb"));
            assert!(store.remove_credential(&CredentialId::new("aa")));
        }

        let state = open_store(&db_path).get();
        assert!(!state.is_registered(&CredentialId::new("aa")));
        assert!(state.is_registered(&CredentialId::new("bb")));
    }

    #[test]
    fn test_onboarding_flag_persists() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("policy.db");

        {
            let store = open_store(&db_path);
            assert!(store.is_first_run());
            store.complete_onboarding();
        }

        assert!(!open_store(&db_path).is_first_run());
    }
}

// =============================================================================
// Raw Backend Tests
// =============================================================================

mod backend {
    use super::*;

    #[test]
    fn test_sets_are_stored_as_json_arrays() {
        let backend = Arc::new(SqliteStore::open_in_memory().unwrap());
        let store = PolicyStore::open(Arc::clone(&backend) as Arc<dyn KeyValueStore>);

        store.set_blocked_apps([AppId::new("com.y.social"), AppId::new("com.x.games")]);

        let raw = backend.get("blocked_apps").unwrap().unwrap();
        assert_eq!(raw, r#"["com.x.games","com.y.social"]"#);
    }

    #[test]
    fn test_concurrent_readers_see_whole_sets() {
        let store = Arc::new(PolicyStore::open(Arc::new(SqliteStore::open_in_memory().unwrap())));
        let small: Vec<AppId> = vec![AppId::new("a")];
        let large: Vec<AppId> = (0..50).map(|i| AppId::new(format!("app.{i}"))).collect();

        let writer = {
            let store = Arc::clone(&store);
            let small = small.clone();
            let large = large.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    if i % 2 == 0 {
                        store.set_blocked_apps(small.clone());
                    } else {
                        store.set_blocked_apps(large.clone());
                    }
                }
            })
        };

        for _ in 0..200 {
            let len = store.get().blocked_apps.len();
            assert!(len == 0 || len == 1 || len == 50, "observed partial set of {len}");
        }
        writer.join().unwrap();
    }
}
