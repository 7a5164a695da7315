//! TTL article cache on top of a [`CacheStorage`] backend.
//!
//! The cache never fails its caller: storage errors and corrupt payloads are
//! logged and reported as a miss, so the rest of the client keeps working
//! with an always-empty cache.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, warn};

use crate::domain::Article;
use crate::store::{CacheStorage, NullStorage, StoredEntry};

pub const DEFAULT_TTL_MINUTES: i64 = 10;
/// One year.
pub const MAX_TTL_MINUTES: i64 = 525_600;

/// Summary of one cache entry for `cache status`.
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub key: String,
    /// `None` when the payload no longer decodes.
    pub articles: Option<usize>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub valid: bool,
}

#[derive(Clone)]
pub struct ArticleCache {
    storage: Arc<dyn CacheStorage + Send + Sync>,
}

impl ArticleCache {
    pub fn new(storage: Arc<dyn CacheStorage + Send + Sync>) -> Self {
        Self { storage }
    }

    /// A cache that never remembers anything.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullStorage))
    }

    pub fn get(&self, key: &str) -> Option<Vec<Article>> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<Article>> {
        let entry = match self.storage.get(key) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                warn!("Cache read for {} failed, treating as miss: {}", key, e);
                return None;
            }
        };

        if !entry.is_valid_at(now) {
            debug!("Cache entry {} expired at {}", key, entry.expires_at);
            return None;
        }

        match serde_json::from_str::<Vec<Article>>(&entry.payload) {
            Ok(articles) => {
                debug!("Cache hit for {} ({} articles)", key, articles.len());
                Some(articles)
            }
            Err(e) => {
                warn!("Corrupt cache entry {}, ignoring: {}", key, e);
                None
            }
        }
    }

    pub fn put(&self, key: &str, articles: &[Article], ttl_minutes: i64) -> bool {
        self.put_at(key, articles, ttl_minutes, Utc::now())
    }

    /// Store `articles` under `key`, replacing whatever was there.
    ///
    /// Returns whether the write reached storage.
    pub fn put_at(
        &self,
        key: &str,
        articles: &[Article],
        ttl_minutes: i64,
        now: DateTime<Utc>,
    ) -> bool {
        let payload = match serde_json::to_string(articles) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialize {} for cache: {}", key, e);
                return false;
            }
        };

        let Some(expires_at) = Duration::try_minutes(ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
        else {
            error!("Cache TTL of {} minutes is out of range", ttl_minutes);
            return false;
        };

        if let Err(e) = self.storage.purge_expired(now) {
            warn!("Failed to purge expired cache entries: {}", e);
        }

        let entry = StoredEntry {
            key: key.to_string(),
            payload,
            created_at: now,
            expires_at,
        };

        match self.storage.set(&entry) {
            Ok(()) => {
                debug!(
                    "Cached {} articles under {} until {}",
                    articles.len(),
                    key,
                    entry.expires_at
                );
                true
            }
            Err(e) => {
                warn!("Cache write for {} failed: {}", key, e);
                false
            }
        }
    }

    pub fn invalidate(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            warn!("Failed to invalidate cache entry {}: {}", key, e);
        }
    }

    pub fn clear(&self) -> usize {
        match self.storage.clear() {
            Ok(count) => count,
            Err(e) => {
                warn!("Failed to clear cache: {}", e);
                0
            }
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> Vec<CacheStatus> {
        let entries = match self.storage.entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to list cache entries: {}", e);
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .map(|entry| CacheStatus {
                articles: serde_json::from_str::<Vec<Article>>(&entry.payload)
                    .ok()
                    .map(|a| a.len()),
                valid: entry.is_valid_at(now),
                key: entry.key,
                created_at: entry.created_at,
                expires_at: entry.expires_at,
            })
            .collect()
    }
}
