use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::error::{NewsError, Result};
use crate::cache::ArticleCache;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpSource;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::{ArticleSource, FetchCoordinator};
use crate::scheduler::{spawn_scheduler, SchedulerHandle};
use crate::store::{CacheStorage, NullStorage, SqliteStorage};
use crate::view::FeedSession;

pub struct AppContext {
    pub config: Config,
    pub cache: ArticleCache,
    pub coordinator: Arc<FetchCoordinator>,
    /// Database file backing the cache, if any.
    pub cache_path: Option<PathBuf>,
}

impl AppContext {
    /// Wire up the HTTP source and the cache described by `config`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let source: Arc<dyn ArticleSource + Send + Sync> =
            Arc::new(HttpSource::new(&config.api.base_url, config.api_timeout())?);

        let (storage, cache_path) = Self::open_storage(&config);
        Ok(Self::with_parts(config, source, storage, cache_path))
    }

    pub fn with_parts(
        config: Config,
        source: Arc<dyn ArticleSource + Send + Sync>,
        storage: Arc<dyn CacheStorage + Send + Sync>,
        cache_path: Option<PathBuf>,
    ) -> Self {
        let cache = ArticleCache::new(storage);
        let fan_out = ParallelFetcher::with_workers(source.clone(), config.feeds.fanout_workers);
        let coordinator = Arc::new(FetchCoordinator::new(
            source,
            fan_out,
            cache.clone(),
            config.coordinator_config(),
        ));

        Self {
            config,
            cache,
            coordinator,
            cache_path,
        }
    }

    /// A cache that cannot be opened is replaced by one that stores nothing.
    fn open_storage(config: &Config) -> (Arc<dyn CacheStorage + Send + Sync>, Option<PathBuf>) {
        if !config.cache.enabled {
            info!("Article cache disabled");
            return (Arc::new(NullStorage), None);
        }

        let path = match config.cache.path.clone() {
            Some(path) => path,
            None => match Self::default_cache_path() {
                Ok(path) => path,
                Err(e) => {
                    warn!("No cache location available, running without cache: {}", e);
                    return (Arc::new(NullStorage), None);
                }
            },
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Could not create {}: {}", parent.display(), e);
            }
        }

        match SqliteStorage::new(&path) {
            Ok(storage) => (Arc::new(storage), Some(path)),
            Err(e) => {
                warn!(
                    "Could not open cache at {}, running without cache: {}",
                    path.display(),
                    e
                );
                (Arc::new(NullStorage), None)
            }
        }
    }

    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| NewsError::Config("Could not find data directory".into()))?;
        let dir = data_dir.join("newsguard");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn default_cache_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("cache.db"))
    }

    /// A view session configured with this context's filters and windows.
    pub fn session(&self) -> FeedSession {
        FeedSession::new(self.config.filter_engine(), self.config.window)
    }

    /// Start a refresh scheduler driving this context's coordinator. The view
    /// starts closed.
    pub fn scheduler(&self) -> Result<SchedulerHandle> {
        Ok(spawn_scheduler(
            self.coordinator.clone(),
            self.config.refresh_interval()?,
            self.config.min_busy(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_disabled_cache_uses_null_storage() {
        let mut config = Config::default();
        config.cache.enabled = false;

        let ctx = AppContext::new(config).unwrap();
        assert!(ctx.cache_path.is_none());
        ctx.cache.put("live_news", &[crate::domain::Article::new(1, "a")], 10);
        assert!(ctx.cache.get("live_news").is_none());
    }

    #[test]
    fn test_configured_cache_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.cache.path = Some(dir.path().join("cache.db"));

        let ctx = AppContext::new(config).unwrap();
        assert_eq!(ctx.cache_path.as_deref(), Some(dir.path().join("cache.db").as_path()));
        ctx.cache.put("live_news", &[crate::domain::Article::new(1, "a")], 10);
        assert_eq!(ctx.cache.get("live_news").unwrap().len(), 1);
    }

    #[test]
    fn test_unopenable_cache_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        // A directory cannot be opened as a database file.
        config.cache.path = Some(dir.path().to_path_buf());

        let ctx = AppContext::new(config).unwrap();
        assert!(ctx.cache_path.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.refresh.interval = "whenever".to_string();
        assert!(matches!(
            AppContext::new(config),
            Err(NewsError::ConfigFile(ConfigError::Invalid { .. }))
        ));

        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(AppContext::new(config).is_err());
    }
}
