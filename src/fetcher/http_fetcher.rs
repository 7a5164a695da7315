use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use url::Url;

use crate::app::{FetchError, Result};
use crate::domain::FeedKey;
use crate::fetcher::title_check::{TitleCheckRequest, TITLE_CHECK_ENDPOINT};
use crate::fetcher::{ArticleSource, FetchResult, TitleCheck, TitleChecker};
use crate::normalizer::Normalizer;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Article source backed by the news API over HTTP.
pub struct HttpSource {
    client: Client,
    base_url: Url,
    normalizer: Normalizer,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("newsguard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: Self::normalize_base(base_url)?,
            normalizer: Normalizer::new(),
        })
    }

    /// The base URL always ends in `/` so endpoint joins append instead of
    /// replacing the last path segment.
    fn normalize_base(base_url: &str) -> Result<Url> {
        let mut url = Url::parse(base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn url_for(&self, feed: &FeedKey) -> std::result::Result<Url, FetchError> {
        self.base_url
            .join(&feed.endpoint())
            .map_err(|e| FetchError::Network(format!("bad endpoint for {}: {}", feed, e)))
    }

    pub fn title_check_url(&self) -> std::result::Result<Url, FetchError> {
        self.base_url
            .join(TITLE_CHECK_ENDPOINT)
            .map_err(|e| FetchError::Network(format!("bad title check endpoint: {}", e)))
    }
}

#[async_trait]
impl ArticleSource for HttpSource {
    async fn fetch(&self, feed: &FeedKey) -> FetchResult {
        let url = self.url_for(feed)?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        response.error_for_status_ref()?;

        let body = response.bytes().await?;
        self.normalizer.normalize(&body)
    }
}

#[async_trait]
impl TitleChecker for HttpSource {
    async fn check_title(
        &self,
        title: &str,
        use_meta_model: bool,
    ) -> std::result::Result<TitleCheck, FetchError> {
        let url = self.title_check_url()?;
        let body = serde_json::to_vec(&TitleCheckRequest {
            user_news: title,
            use_meta_model,
        })?;

        let response = self
            .client
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await?;

        response.error_for_status_ref()?;

        let body = response.bytes().await?;
        TitleCheck::decode(&body)
    }
}
