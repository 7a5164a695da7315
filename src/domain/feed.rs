use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::Article;

/// One logical, independently cached and fetched collection of articles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedKey {
    /// Rolling live feed shown on the home view.
    Live,
    /// Articles of a single category.
    Category(String),
    /// The "all news" archive; same endpoint as `Live`, separate cache entry.
    Archive,
}

impl FeedKey {
    pub fn category(name: impl Into<String>) -> Self {
        FeedKey::Category(name.into())
    }

    pub fn cache_key(&self) -> String {
        match self {
            FeedKey::Live => "live_news".to_string(),
            FeedKey::Category(name) => format!("category_news:{}", name),
            FeedKey::Archive => "all_news".to_string(),
        }
    }

    /// Path relative to the API base URL.
    pub fn endpoint(&self) -> String {
        match self {
            FeedKey::Live | FeedKey::Archive => "api/live/".to_string(),
            FeedKey::Category(name) => format!("api/category/{}/", name),
        }
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKey::Live => write!(f, "live"),
            FeedKey::Category(name) => write!(f, "category/{}", name),
            FeedKey::Archive => write!(f, "archive"),
        }
    }
}

/// Where the currently displayed collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotOrigin {
    #[default]
    Empty,
    Cache,
    Network,
}

/// Published state of one feed.
///
/// `generation` only moves when the sequence of article ids changes, so a
/// refresh that returns the same articles does not disturb downstream
/// window positions.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub articles: Arc<Vec<Article>>,
    pub origin: SnapshotOrigin,
    pub using_fallback: bool,
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// Next snapshot holding `articles`.
    ///
    /// Network data clears the fallback flag; any other origin carries it
    /// over unchanged.
    pub fn replaced(&self, articles: Vec<Article>, origin: SnapshotOrigin) -> Self {
        let generation = if same_ids(&self.articles, &articles) {
            self.generation
        } else {
            self.generation + 1
        };
        let updated_at = match origin {
            SnapshotOrigin::Network => Some(Utc::now()),
            _ => self.updated_at,
        };

        Self {
            articles: Arc::new(articles),
            origin,
            using_fallback: match origin {
                SnapshotOrigin::Network => false,
                _ => self.using_fallback,
            },
            generation,
            updated_at,
        }
    }

    /// The same snapshot, flagged as standing in for a failed refresh.
    pub fn falling_back(&self) -> Self {
        Self {
            using_fallback: true,
            ..self.clone()
        }
    }
}

fn same_ids(a: &[Article], b: &[Article]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id == y.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(ids: &[i64]) -> Vec<Article> {
        ids.iter().map(|&id| Article::new(id, format!("a{}", id))).collect()
    }

    #[test]
    fn test_cache_keys_are_distinct() {
        let keys = [
            FeedKey::Live.cache_key(),
            FeedKey::Archive.cache_key(),
            FeedKey::category("News").cache_key(),
            FeedKey::category("Sport").cache_key(),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_archive_shares_live_endpoint() {
        assert_eq!(FeedKey::Live.endpoint(), FeedKey::Archive.endpoint());
        assert_eq!(FeedKey::category("Arts").endpoint(), "api/category/Arts/");
    }

    #[test]
    fn test_generation_bumps_only_on_identity_change() {
        let empty = FeedSnapshot::default();
        let first = empty.replaced(articles(&[1, 2, 3]), SnapshotOrigin::Cache);
        assert_eq!(first.generation, 1);
        assert!(!first.using_fallback);

        let first = first.falling_back();
        assert_eq!(first.generation, 1);
        let cached_again = first.replaced(articles(&[1, 2, 3]), SnapshotOrigin::Cache);
        assert!(cached_again.using_fallback);

        let same = cached_again.replaced(articles(&[1, 2, 3]), SnapshotOrigin::Network);
        assert_eq!(same.generation, 1);
        assert!(!same.using_fallback);
        assert!(same.updated_at.is_some());

        let reordered = same.replaced(articles(&[3, 2, 1]), SnapshotOrigin::Network);
        assert_eq!(reordered.generation, 2);
    }
}
