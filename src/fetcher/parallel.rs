use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::app::FetchError;
use crate::domain::{Article, FeedKey};
use crate::fetcher::{ArticleSource, FetchResult};

pub const DEFAULT_WORKERS: usize = 4;

/// Issues many feed requests at once, bounded by a semaphore.
pub struct ParallelFetcher {
    source: Arc<dyn ArticleSource + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(source: Arc<dyn ArticleSource + Send + Sync>) -> Self {
        Self::with_workers(source, DEFAULT_WORKERS)
    }

    pub fn with_workers(source: Arc<dyn ArticleSource + Send + Sync>, workers: usize) -> Self {
        Self {
            source,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Fetch every feed concurrently. Results come back in input order, one
    /// per feed, whatever order the requests finish in.
    pub async fn fetch_all(&self, feeds: Vec<FeedKey>) -> Vec<(FeedKey, FetchResult)> {
        let mut handles = Vec::with_capacity(feeds.len());

        for feed in feeds.iter().cloned() {
            let source = self.source.clone();
            let semaphore = self.semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return Err(FetchError::Network("fetch pool closed".to_string()));
                    }
                };
                source.fetch(&feed).await
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .zip(feeds)
            .map(|(joined, feed)| {
                let result = joined.unwrap_or_else(|e| {
                    error!("Fetch task for {} failed: {}", feed, e);
                    Err(FetchError::Network(format!("fetch task failed: {}", e)))
                });
                (feed, result)
            })
            .collect()
    }

    /// One representative article per category, in category order.
    ///
    /// A category that fails or comes back empty contributes nothing.
    pub async fn fetch_representatives(&self, categories: &[String]) -> Vec<Article> {
        let feeds = categories.iter().map(FeedKey::category).collect();

        self.fetch_all(feeds)
            .await
            .into_iter()
            .filter_map(|(feed, result)| match result {
                Ok(articles) => {
                    let first = articles.into_iter().next();
                    if first.is_none() {
                        debug!("No articles for {}", feed);
                    }
                    first
                }
                Err(e) => {
                    warn!("Failed to fetch {}: {}", feed, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;

    /// Answers category requests from a table, with per-category delays so
    /// completion order differs from request order.
    struct TableSource {
        responses: HashMap<String, (u64, Option<Vec<Article>>)>,
    }

    #[async_trait]
    impl ArticleSource for TableSource {
        async fn fetch(&self, feed: &FeedKey) -> FetchResult {
            let FeedKey::Category(name) = feed else {
                return Err(FetchError::Network("unexpected feed".into()));
            };
            match self.responses.get(name) {
                Some((delay_ms, response)) => {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                    response
                        .clone()
                        .ok_or_else(|| FetchError::Network("connection reset".into()))
                }
                None => Err(FetchError::Decode("unknown category".into())),
            }
        }
    }

    fn article(id: i64, section: &str) -> Article {
        let mut a = Article::new(id, format!("{} story", section));
        a.section_name = Some(section.to_string());
        a
    }

    fn categories() -> Vec<String> {
        ["Sport", "Lifestyle", "Arts", "News"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_failed_category_contributes_nothing() {
        let mut responses = HashMap::new();
        responses.insert("Sport".to_string(), (30, Some(vec![article(1, "Sport")])));
        responses.insert("Lifestyle".to_string(), (0, None));
        responses.insert("Arts".to_string(), (10, Some(vec![article(3, "Arts")])));
        responses.insert("News".to_string(), (0, Some(vec![article(4, "News")])));

        let fetcher = ParallelFetcher::new(Arc::new(TableSource { responses }));
        let aggregate = fetcher.fetch_representatives(&categories()).await;

        let sections: Vec<_> = aggregate.iter().map(|a| a.section_label()).collect();
        assert_eq!(sections, vec!["Sport", "Arts", "News"]);
    }

    #[tokio::test]
    async fn test_only_first_article_per_category() {
        let mut responses = HashMap::new();
        responses.insert(
            "Sport".to_string(),
            (0, Some(vec![article(1, "Sport"), article(2, "Sport")])),
        );
        responses.insert("Arts".to_string(), (0, Some(Vec::new())));

        let fetcher = ParallelFetcher::with_workers(Arc::new(TableSource { responses }), 1);
        let aggregate = fetcher
            .fetch_representatives(&["Sport".to_string(), "Arts".to_string()])
            .await;

        assert_eq!(aggregate.len(), 1);
        assert_eq!(aggregate[0].id, 1);
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_input_order() {
        let mut responses = HashMap::new();
        responses.insert("A".to_string(), (20, Some(vec![article(1, "A")])));
        responses.insert("B".to_string(), (0, Some(vec![article(2, "B")])));

        let fetcher = ParallelFetcher::new(Arc::new(TableSource { responses }));
        let results = fetcher
            .fetch_all(vec![FeedKey::category("A"), FeedKey::category("B"), FeedKey::category("C")])
            .await;

        assert_eq!(results[0].0, FeedKey::category("A"));
        assert_eq!(results[1].0, FeedKey::category("B"));
        assert!(matches!(results[2].1, Err(FetchError::Decode(_))));
    }
}
