use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::app::{NewsError, Result};
use crate::store::{CacheStorage, StoredEntry};

/// Process-local storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, StoredEntry>) -> T) -> Result<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| NewsError::Storage(format!("memory cache poisoned: {}", e)))?;
        Ok(f(&mut entries))
    }
}

impl CacheStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<StoredEntry>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, entry: &StoredEntry) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(entry.key.clone(), entry.clone());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<usize> {
        self.with_entries(|entries| {
            let count = entries.len();
            entries.clear();
            count
        })
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        self.with_entries(|entries| {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_valid_at(now));
            before - entries.len()
        })
    }

    fn entries(&self) -> Result<Vec<StoredEntry>> {
        self.with_entries(|entries| {
            let mut all: Vec<_> = entries.values().cloned().collect();
            all.sort_by(|a, b| a.key.cmp(&b.key));
            all
        })
    }
}

/// Storage that keeps nothing; used when caching is disabled.
pub struct NullStorage;

impl CacheStorage for NullStorage {
    fn get(&self, _key: &str) -> Result<Option<StoredEntry>> {
        Ok(None)
    }

    fn set(&self, _entry: &StoredEntry) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn clear(&self) -> Result<usize> {
        Ok(0)
    }

    fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize> {
        Ok(0)
    }

    fn entries(&self) -> Result<Vec<StoredEntry>> {
        Ok(Vec::new())
    }
}
