use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{NewsError, Result};
use crate::store::{CacheStorage, StoredEntry};

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| NewsError::Storage(format!("migration failed: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| NewsError::Storage(format!("cache connection poisoned: {}", e)))
    }

    fn from_millis(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap_or_default()
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
        Ok(StoredEntry {
            key: row.get(0)?,
            payload: row.get(1)?,
            created_at: Self::from_millis(row.get(2)?),
            expires_at: Self::from_millis(row.get(3)?),
        })
    }
}

impl CacheStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<StoredEntry>> {
        let conn = self.lock()?;

        let entry = conn
            .query_row(
                "SELECT key, payload, created_at, expires_at FROM cache_entries WHERE key = ?1",
                params![key],
                Self::map_row,
            )
            .optional()?;

        Ok(entry)
    }

    fn set(&self, entry: &StoredEntry) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO cache_entries (key, payload, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET payload = ?2, created_at = ?3, expires_at = ?4",
            params![
                entry.key,
                entry.payload,
                entry.created_at.timestamp_millis(),
                entry.expires_at.timestamp_millis()
            ],
        )?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM cache_entries", [])?;
        Ok(removed)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM cache_entries WHERE expires_at <= ?1",
            params![now.timestamp_millis()],
        )?;
        Ok(removed)
    }

    fn entries(&self) -> Result<Vec<StoredEntry>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT key, payload, created_at, expires_at FROM cache_entries ORDER BY key",
        )?;

        let entries = stmt
            .query_map([], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
