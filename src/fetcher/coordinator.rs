//! Keeps each feed's in-memory collection fresh.
//!
//! Every feed refresh surfaces the cached collection first, then asks the
//! network. A successful non-empty response replaces the collection and is
//! written back to the cache; anything else keeps what is already shown.
//! Feeds are refreshed independently so one failing feed never holds back or
//! rolls back another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::app::FetchError;
use crate::cache::{ArticleCache, DEFAULT_TTL_MINUTES};
use crate::domain::{Article, FeedKey, FeedSnapshot, SnapshotOrigin};
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::ArticleSource;

/// How a feed refresh treats a valid cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Show the cached collection, then fetch anyway.
    Revalidate,
    /// A valid cache entry is the answer; only a miss goes to the network.
    PreferCache,
}

/// What one feed refresh ended with.
#[derive(Debug, Clone)]
pub enum FeedOutcome {
    /// Network returned this many articles.
    Fresh(usize),
    /// Served from cache without touching the network.
    Cached(usize),
    /// Network answered with nothing; existing data kept.
    Empty,
    Failed(FetchError),
}

impl FeedOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FeedOutcome::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub live: FeedOutcome,
    pub secondary: FeedOutcome,
    /// Number of categories that produced a spotlight article.
    pub spotlight: usize,
}

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub ttl_minutes: i64,
    /// Category shown in the "Must See" strip.
    pub secondary_category: String,
    /// Categories sampled for the spotlight, in display order.
    pub spotlight_categories: Vec<String>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_TTL_MINUTES,
            secondary_category: "News".to_string(),
            spotlight_categories: ["Sport", "Lifestyle", "Arts", "News"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

pub struct FetchCoordinator {
    source: Arc<dyn ArticleSource + Send + Sync>,
    fan_out: ParallelFetcher,
    cache: ArticleCache,
    config: CoordinatorConfig,
    feeds: Mutex<HashMap<FeedKey, Arc<watch::Sender<FeedSnapshot>>>>,
    spotlight: watch::Sender<FeedSnapshot>,
}

impl FetchCoordinator {
    pub fn new(
        source: Arc<dyn ArticleSource + Send + Sync>,
        fan_out: ParallelFetcher,
        cache: ArticleCache,
        config: CoordinatorConfig,
    ) -> Self {
        let (spotlight, _) = watch::channel(FeedSnapshot::default());
        Self {
            source,
            fan_out,
            cache,
            config,
            feeds: Mutex::new(HashMap::new()),
            spotlight,
        }
    }

    pub fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    pub fn secondary_feed(&self) -> FeedKey {
        FeedKey::category(self.config.secondary_category.clone())
    }

    pub fn subscribe(&self, feed: &FeedKey) -> watch::Receiver<FeedSnapshot> {
        self.channel(feed).subscribe()
    }

    pub fn subscribe_spotlight(&self) -> watch::Receiver<FeedSnapshot> {
        self.spotlight.subscribe()
    }

    pub fn snapshot(&self, feed: &FeedKey) -> FeedSnapshot {
        self.channel(feed).borrow().clone()
    }

    pub fn spotlight(&self) -> FeedSnapshot {
        self.spotlight.borrow().clone()
    }

    fn channel(&self, feed: &FeedKey) -> Arc<watch::Sender<FeedSnapshot>> {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        feeds
            .entry(feed.clone())
            .or_insert_with(|| {
                let (tx, _) = watch::channel(FeedSnapshot::default());
                Arc::new(tx)
            })
            .clone()
    }

    /// Replace the feed's articles. `fallback` marks them as standing in for
    /// a failed refresh; otherwise the flag follows [`FeedSnapshot::replaced`].
    fn publish(
        &self,
        feed: &FeedKey,
        articles: Vec<Article>,
        origin: SnapshotOrigin,
        fallback: bool,
    ) {
        let channel = self.channel(feed);
        // No subscriber is fine; the value is still kept for later readers.
        channel.send_modify(|current| {
            *current = current.replaced(articles, origin);
            if fallback {
                current.using_fallback = true;
            }
            debug!(
                "Published {} for {} ({} articles, generation {})",
                match origin {
                    SnapshotOrigin::Network => "network data",
                    SnapshotOrigin::Cache => "cached data",
                    SnapshotOrigin::Empty => "empty data",
                },
                feed,
                current.len(),
                current.generation
            );
        });
    }

    /// Refresh the live feed, the secondary category feed and the spotlight
    /// fan-out concurrently.
    pub async fn refresh_cycle(&self) -> CycleReport {
        let secondary = self.secondary_feed();

        let (live, secondary, spotlight) = tokio::join!(
            self.refresh_feed(&FeedKey::Live, FetchPolicy::Revalidate),
            self.refresh_feed(&secondary, FetchPolicy::Revalidate),
            self.refresh_spotlight(),
        );

        let report = CycleReport {
            live,
            secondary,
            spotlight,
        };
        info!(
            "Refresh cycle: live={:?} secondary={:?} spotlight={}",
            report.live, report.secondary, report.spotlight
        );
        report
    }

    /// Load the all-news archive, preferring a valid cached copy.
    pub async fn load_archive(&self) -> FeedOutcome {
        self.refresh_feed(&FeedKey::Archive, FetchPolicy::PreferCache)
            .await
    }

    pub async fn refresh_feed(&self, feed: &FeedKey, policy: FetchPolicy) -> FeedOutcome {
        let cache_key = feed.cache_key();

        let surfaced = match self.cache.get(&cache_key) {
            Some(cached) if !cached.is_empty() => {
                let count = cached.len();
                self.publish(feed, cached, SnapshotOrigin::Cache, false);
                if policy == FetchPolicy::PreferCache {
                    debug!("Serving {} from cache ({} articles)", feed, count);
                    return FeedOutcome::Cached(count);
                }
                true
            }
            _ => false,
        };

        match self.source.fetch(feed).await {
            Ok(articles) if articles.is_empty() => {
                debug!("{} returned no articles, keeping current data", feed);
                FeedOutcome::Empty
            }
            Ok(articles) => {
                let count = articles.len();
                self.cache
                    .put(&cache_key, &articles, self.config.ttl_minutes);
                self.publish(feed, articles, SnapshotOrigin::Network, false);
                FeedOutcome::Fresh(count)
            }
            Err(e) => {
                warn!("Fetching {} failed: {}", feed, e);
                if !surfaced {
                    match self.cache.get(&cache_key) {
                        Some(cached) if !cached.is_empty() => {
                            info!("Falling back to cached {} ({} articles)", feed, cached.len());
                            self.publish(feed, cached, SnapshotOrigin::Cache, true);
                        }
                        _ => debug!("No cached fallback for {}", feed),
                    }
                }
                // Whatever is still shown now stands in for the failed request.
                self.channel(feed).send_if_modified(|current| {
                    if current.is_empty() || current.using_fallback {
                        return false;
                    }
                    *current = current.falling_back();
                    true
                });
                FeedOutcome::Failed(e)
            }
        }
    }

    /// Fan out one request per spotlight category and publish the articles
    /// that came back. Returns how many categories contributed.
    pub async fn refresh_spotlight(&self) -> usize {
        let articles = self
            .fan_out
            .fetch_representatives(&self.config.spotlight_categories)
            .await;

        let count = articles.len();
        if count == 0 {
            debug!("Spotlight fan-out produced nothing, keeping current data");
            return 0;
        }

        self.spotlight.send_modify(|current| {
            *current = current.replaced(articles, SnapshotOrigin::Network);
        });
        count
    }
}
