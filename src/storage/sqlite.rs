/// SQLite-backed key-value store.
use anyhow::Result;
use chrono::Local;
use rusqlite::Connection;

use super::KeyValueStore;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// All stored keys, sorted.
    #[cfg(test)]
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, Local::now().to_rfc3339()),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::open_in_memory;

    #[test]
    fn set_get_remove() {
        let store = open_in_memory().unwrap();
        assert_eq!(store.get("projects").unwrap(), None);
        store.set("projects", "[1]").unwrap();
        store.set("projects", "[2]").unwrap();
        assert_eq!(store.get("projects").unwrap().as_deref(), Some("[2]"));
        store.remove("projects").unwrap();
        assert_eq!(store.get("projects").unwrap(), None);
        store.remove("projects").unwrap();
    }

    #[test]
    fn keys_are_sorted() {
        let store = open_in_memory().unwrap();
        store.set("timer_sessions", "{}").unwrap();
        store.set("projects", "{}").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["projects", "timer_sessions"]);
    }
}
