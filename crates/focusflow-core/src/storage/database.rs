//! SQLite-backed Shared Store.
//!
//! Every record lives as one JSON text value in the `kv` table, keyed by
//! its [`StoreKey`] name. Separate processes opening the same file share
//! state through it.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use super::{data_dir, KeyValueStore, StoreKey};
use crate::error::{CoreError, StoreError};
use crate::storage::Config;

/// SQLite database holding the key-value namespace.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database named in `config` under the data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &Config) -> Result<Self, CoreError> {
        let path = data_dir()?.join(&config.storage.database_file);
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );",
        )?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get_raw(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key.as_str()], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_raw(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at)
             VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
            params![key.as_str(), value],
        )?;
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key.as_str()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreExt;
    use crate::timer::PomodoroRecord;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.get_raw(StoreKey::Goals).unwrap().is_none());
        db.set_raw(StoreKey::Goals, "[]").unwrap();
        assert_eq!(db.get_raw(StoreKey::Goals).unwrap().unwrap(), "[]");
        db.remove(StoreKey::Goals).unwrap();
        assert!(db.get_raw(StoreKey::Goals).unwrap().is_none());
    }

    #[test]
    fn two_handles_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");
        let popup = Database::open_at(&path).unwrap();
        let background = Database::open_at(&path).unwrap();

        let record = PomodoroRecord {
            time_remaining: 600,
            is_running: true,
            ..PomodoroRecord::default()
        };
        popup.save(StoreKey::Pomodoro, &record).unwrap();

        let seen: PomodoroRecord = background.load(StoreKey::Pomodoro).unwrap().unwrap();
        assert_eq!(seen, record);
    }
}
