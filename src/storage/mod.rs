/// Persistence: a key-value store over SQLite plus versioned record envelopes.
mod migrations;
mod schema;
mod sqlite;

use std::path::{Path, PathBuf};

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use schema::{Decoded, SCHEMA_VERSION, decode, encode};
pub use sqlite::SqliteStore;

pub const PROJECTS_KEY: &str = "projects";
pub const CLIENTS_KEY: &str = "clients";
pub const SESSIONS_KEY: &str = "timer_sessions";
pub const TIMER_STATE_KEY: &str = "timer_state";

/// Minimal string-to-string storage the stores snapshot themselves into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Opens (or creates) the SQLite database and runs migrations.
pub fn init(db_path: &Path) -> Result<SqliteStore> {
    let conn = Connection::open(db_path)?;
    migrations::run_migrations(&conn)?;
    Ok(SqliteStore::new(conn))
}

#[cfg(test)]
pub fn open_in_memory() -> Result<SqliteStore> {
    let conn = Connection::open_in_memory()?;
    migrations::run_migrations(&conn)?;
    Ok(SqliteStore::new(conn))
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./billable.db` when no data dir is found.
pub fn default_db_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join("billable");
        std::fs::create_dir_all(&app_dir).ok();
        app_dir.join("billable.db")
    } else {
        PathBuf::from("billable.db")
    }
}

/// Reads and decodes `key`. Every failure degrades to `None` after logging;
/// a blob that cannot be decoded is parked under `<key>.rejected`.
pub fn load<T: DeserializeOwned + Serialize>(kv: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::error!(key, error = %err, "failed to read persisted state");
            return None;
        }
    };
    match decode::<T>(&raw) {
        Ok(Decoded::Current(records)) => Some(records),
        Ok(Decoded::Migrated(records)) => {
            tracing::warn!(key, "migrating legacy record blob to schema v{SCHEMA_VERSION}");
            save(kv, key, &records);
            Some(records)
        }
        Err(err) => {
            tracing::error!(key, error = %err, "rejecting persisted state");
            let rejected_key = format!("{key}.rejected");
            if let Err(err) = kv.set(&rejected_key, &raw) {
                tracing::error!(key = %rejected_key, error = %err, "failed to keep rejected blob");
            }
            None
        }
    }
}

/// Writes a snapshot of `records`. Failures are logged and reported as `false`;
/// the caller's in-memory state stays authoritative.
pub fn save<T: Serialize>(kv: &dyn KeyValueStore, key: &str, records: &T) -> bool {
    let raw = match encode(records) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::error!(key, error = %err, "failed to encode state");
            return false;
        }
    };
    match kv.set(key, &raw) {
        Ok(()) => {
            tracing::debug!(key, bytes = raw.len(), "persisted state");
            true
        }
        Err(err) => {
            tracing::error!(key, error = %err, "failed to persist state");
            false
        }
    }
}

pub fn remove(kv: &dyn KeyValueStore, key: &str) -> bool {
    match kv.remove(key) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(key, error = %err, "failed to remove persisted state");
            false
        }
    }
}

#[cfg(test)]
pub mod testing {
    use anyhow::{Result, anyhow};

    use super::KeyValueStore;

    /// Store whose reads succeed but whose writes always fail.
    pub struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("disk full"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(anyhow!("disk full"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_key_is_none() {
        let kv = open_in_memory().unwrap();
        assert_eq!(load::<Vec<String>>(&kv, PROJECTS_KEY), None);
    }

    #[test]
    fn save_then_load() {
        let kv = open_in_memory().unwrap();
        assert!(save(&kv, PROJECTS_KEY, &vec!["a".to_string()]));
        assert_eq!(
            load::<Vec<String>>(&kv, PROJECTS_KEY),
            Some(vec!["a".to_string()])
        );
    }

    #[test]
    fn legacy_arrays_are_rewritten_in_place() {
        std::sync::LazyLock::force(&crate::logging::TEST_LOGGING);
        let kv = open_in_memory().unwrap();
        kv.set(SESSIONS_KEY, r#"["x"]"#).unwrap();
        assert_eq!(load::<Vec<String>>(&kv, SESSIONS_KEY), Some(vec!["x".to_string()]));
        let raw = kv.get(SESSIONS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"version\":1"));
    }

    #[test]
    fn rejected_blobs_are_parked() {
        std::sync::LazyLock::force(&crate::logging::TEST_LOGGING);
        let kv = open_in_memory().unwrap();
        kv.set(PROJECTS_KEY, r#"{"version":99,"records":[]}"#).unwrap();
        assert_eq!(load::<Vec<String>>(&kv, PROJECTS_KEY), None);
        assert_eq!(
            kv.get("projects.rejected").unwrap().as_deref(),
            Some(r#"{"version":99,"records":[]}"#)
        );
    }

    #[test]
    fn write_failures_are_reported_not_raised() {
        let kv = testing::ReadOnlyStore;
        assert!(!save(&kv, PROJECTS_KEY, &Vec::<String>::new()));
        assert!(!remove(&kv, PROJECTS_KEY));
    }

    #[test]
    fn init_creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("billable.db");
        {
            let kv = init(&path).unwrap();
            assert!(save(&kv, CLIENTS_KEY, &vec![1, 2, 3]));
        }
        let kv = init(&path).unwrap();
        assert_eq!(load::<Vec<i32>>(&kv, CLIENTS_KEY), Some(vec![1, 2, 3]));
    }
}
