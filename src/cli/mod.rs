pub mod commands;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::filter::{FilterSelection, Verification};

#[derive(Parser)]
#[command(name = "newsguard")]
#[command(about = "A terminal news reader with fact-check verdicts", long_about = None)]
pub struct Cli {
    /// Base URL of the news service
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Refresh interval (e.g., "10s", "1m")
    #[arg(short, long, global = true)]
    pub interval: Option<String>,

    /// Number of parallel workers for category fetches
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Run without the on-disk article cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Command-line flags take precedence over the config file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(interval) = &self.interval {
            config.refresh.interval = interval.clone();
        }
        if let Some(workers) = self.workers {
            config.feeds.fanout_workers = workers;
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and print the live feed once
    Live {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the "all news" archive
    All {
        /// Number of pages to print
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Keep refreshing and print the live feed whenever it changes
    Watch {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Launch the TUI
    Tui,
    /// Ask the news service whether a headline reads as real news
    Check {
        /// The headline to check
        #[arg(value_parser = non_blank)]
        title: String,

        /// Use the search-backed model instead of the fast classifier
        #[arg(long)]
        meta: bool,
    },
    /// Inspect or clear the article cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

fn non_blank(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Err("enter some text".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Region filter (e.g., "India", "UK")
    #[arg(short, long, default_value = "All")]
    pub region: String,

    /// Topic filter (e.g., "Cricket", "Politics")
    #[arg(short, long, default_value = "All")]
    pub topic: String,

    /// Verification filter: all, verified or fake
    #[arg(short, long, default_value = "all")]
    pub verification: Verification,
}

impl FilterArgs {
    pub fn selection(&self) -> FilterSelection {
        FilterSelection::new(&self.region, &self.topic, self.verification)
    }
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show cached feeds and their expiry
    Status,
    /// Remove every cached feed
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_live_filters() {
        let cli = Cli::parse_from([
            "newsguard",
            "live",
            "--region",
            "India",
            "--verification",
            "fake",
        ]);
        match cli.command {
            Commands::Live { filters } => {
                let selection = filters.selection();
                assert_eq!(selection.region, "India");
                assert_eq!(selection.topic, "All");
                assert_eq!(selection.verification, Verification::Fake);
            }
            _ => panic!("expected live"),
        }
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from([
            "newsguard",
            "all",
            "--pages",
            "3",
            "--api-url",
            "http://localhost:9000",
            "--interval",
            "30s",
            "--no-cache",
        ]);
        assert!(matches!(cli.command, Commands::All { pages: 3 }));

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.refresh.interval, "30s");
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from(["newsguard", "check", " Moon made of cheese ", "--meta"]);
        match cli.command {
            Commands::Check { title, meta } => {
                assert_eq!(title, "Moon made of cheese");
                assert!(meta);
            }
            _ => panic!("expected check"),
        }

        assert!(Cli::try_parse_from(["newsguard", "check", "   "]).is_err());
        assert!(Cli::try_parse_from(["newsguard", "check"]).is_err());
    }

    #[test]
    fn test_cache_subcommands() {
        let cli = Cli::parse_from(["newsguard", "cache", "clear"]);
        assert!(matches!(
            cli.command,
            Commands::Cache {
                action: CacheAction::Clear
            }
        ));
    }
}
