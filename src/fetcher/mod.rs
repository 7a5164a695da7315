pub mod coordinator;
pub mod http_fetcher;
pub mod parallel;
pub mod title_check;

use async_trait::async_trait;

use crate::app::FetchError;
use crate::domain::{Article, FeedKey};

pub use coordinator::{CycleReport, FeedOutcome, FetchCoordinator, FetchPolicy};
pub use title_check::{TitleCheck, TitleChecker};

/// Result of asking the data source for one feed.
pub type FetchResult = std::result::Result<Vec<Article>, FetchError>;

/// Remote article-serving API.
#[async_trait]
pub trait ArticleSource {
    async fn fetch(&self, feed: &FeedKey) -> FetchResult;
}
