//! # newsguard
//!
//! A terminal news reader that keeps a live feed fresh, falls back to cached
//! news when the service is unreachable, and labels every article with its
//! fact-check verdict.
//!
//! ## Architecture
//!
//! ```text
//! HttpSource → FetchCoordinator → ArticleCache
//!                    │
//!              watch snapshots → FeedSession (filter + windows) → CLI / TUI
//!                    ▲
//!            RefreshScheduler
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Print the live feed, verified articles about cricket only
//! newsguard live --topic Cricket --verification verified
//!
//! # Print three pages of the archive
//! newsguard all --pages 3
//!
//! # Launch TUI
//! newsguard tui
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the HTTP
/// source, the cache and the fetch coordinator.
pub mod app;

/// TTL article cache that degrades to a miss on any storage error.
pub mod cache;

/// Command-line interface using clap.
///
/// - `live` - Refresh once and print the home view
/// - `all [--pages N]` - Print the archive
/// - `watch` - Keep refreshing and print changes
/// - `check <title> [--meta]` - Ask the service to classify a headline
/// - `tui` - Launch the TUI
/// - `cache status|clear` - Inspect the article cache
pub mod cli;

/// Configuration loaded from `~/.config/newsguard/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Article`](domain::Article): One news article with its verdict
/// - [`FeedKey`](domain::FeedKey): Identity of a cached, fetched feed
/// - [`FeedSnapshot`](domain::FeedSnapshot): Published state of a feed
pub mod domain;

/// Fetching articles from the news service.
///
/// - [`ArticleSource`](fetcher::ArticleSource): Async trait for fetching one feed
/// - [`HttpSource`](fetcher::http_fetcher::HttpSource): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Bounded category fan-out
/// - [`FetchCoordinator`](fetcher::FetchCoordinator): Cache-first refreshes and snapshots
/// - [`TitleChecker`](fetcher::TitleChecker): Classification of user-typed headlines
pub mod fetcher;

/// Region, topic and verification filters.
pub mod filter;

/// Decoding of API payloads into [`Article`](domain::Article)s.
pub mod normalizer;

/// Periodic, interaction-aware refresh scheduling.
pub mod scheduler;

/// Cache storage backends (SQLite, memory, null).
pub mod store;

/// Terminal user interface.
///
/// Home view with a featured carousel, trendy and must-see strips, top
/// stories and spotlight; archive view with incremental loading.
pub mod tui;

/// View model aggregation.
pub mod view;

/// Carousel, batch and paging windows over filtered feeds.
pub mod window;
