pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::app::Result;

pub use memory::{MemoryStorage, NullStorage};
pub use sqlite::SqliteStorage;

/// A raw cache record: an opaque string payload with its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub key: String,
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Durable key/string store underneath the article cache.
///
/// Implementations report failures; deciding that a failure means "miss" is
/// the caller's business.
pub trait CacheStorage {
    fn get(&self, key: &str) -> Result<Option<StoredEntry>>;
    fn set(&self, entry: &StoredEntry) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<usize>;
    /// Drop every entry whose expiry is at or before `now`.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
    fn entries(&self) -> Result<Vec<StoredEntry>>;
}
