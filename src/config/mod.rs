//! Configuration management for newsguard.
//!
//! Configuration is read from `~/.config/newsguard/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::{DEFAULT_TTL_MINUTES, MAX_TTL_MINUTES};
use crate::fetcher::coordinator::CoordinatorConfig;
use crate::fetcher::http_fetcher::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::fetcher::parallel::DEFAULT_WORKERS;
use crate::filter::FilterEngine;
use crate::scheduler::interval::parse_interval;
use crate::scheduler::{DEFAULT_INTERVAL_SECS, DEFAULT_MIN_BUSY_MS};
use crate::window::WindowConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub cache: CacheConfig,
    pub feeds: FeedsConfig,
    pub window: WindowConfig,
    pub filters: FiltersConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Period of the refresh timer, e.g. "10s" or "1m".
    pub interval: String,
    /// Minimum time the busy indicator stays up after a manual refresh.
    pub min_busy_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: format!("{}s", DEFAULT_INTERVAL_SECS),
            min_busy_ms: DEFAULT_MIN_BUSY_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_minutes: i64,
    /// Database file; defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_minutes: DEFAULT_TTL_MINUTES,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub secondary_category: String,
    pub spotlight_categories: Vec<String>,
    pub fanout_workers: usize,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        let defaults = CoordinatorConfig::default();
        Self {
            secondary_category: defaults.secondary_category,
            spotlight_categories: defaults.spotlight_categories,
            fanout_workers: DEFAULT_WORKERS,
        }
    }
}

/// Extra or replacement keyword sets, keyed by selection name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    pub regions: BTreeMap<String, Vec<String>>,
    pub topics: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/newsguard/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("newsguard").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.refresh_interval()?;
        if !(1..=MAX_TTL_MINUTES).contains(&self.cache.ttl_minutes) {
            return Err(ConfigError::Invalid {
                field: "cache.ttl_minutes",
                message: format!(
                    "must be between 1 and {}, got {}",
                    MAX_TTL_MINUTES, self.cache.ttl_minutes
                ),
            });
        }
        if self.window.trendy_batch == 0
            || self.window.must_see_batch == 0
            || self.window.page_size == 0
        {
            return Err(ConfigError::Invalid {
                field: "window",
                message: "batch and page sizes must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Result<Duration, ConfigError> {
        parse_interval(&self.refresh.interval).map_err(|message| ConfigError::Invalid {
            field: "refresh.interval",
            message,
        })
    }

    pub fn min_busy(&self) -> Duration {
        Duration::from_millis(self.refresh.min_busy_ms)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            ttl_minutes: self.cache.ttl_minutes,
            secondary_category: self.feeds.secondary_category.clone(),
            spotlight_categories: self.feeds.spotlight_categories.clone(),
        }
    }

    pub fn filter_engine(&self) -> FilterEngine {
        FilterEngine::with_overrides(&self.filters.regions, &self.filters.topics)
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# newsguard configuration
#
# Intervals accept a number with a unit suffix: "1500ms", "10s", "1m", "2h".
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, BackTab, Backspace, Delete, Home, End,
#   PageUp, PageDown, Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[api]
base_url = "http://127.0.0.1:8000/"
timeout_secs = 10

[refresh]
# How often the home view refreshes while open. Any navigation restarts it.
interval = "10s"
# The refresh indicator stays up at least this long after a manual refresh
min_busy_ms = 1500

[cache]
enabled = true
ttl_minutes = 10
# path = "/path/to/cache.db"

[feeds]
# Category shown in the "Must See" strip
secondary_category = "News"
# One article from each, in this order
spotlight_categories = ["Sport", "Lifestyle", "Arts", "News"]
fanout_workers = 4

[window]
# Index 0 of the live feed is the featured carousel; trendy starts after it
trendy_base = 1
trendy_batch = 6
must_see_batch = 3
page_size = 12
scroll_threshold = 3

# Extend or replace the built-in filter keywords. Matching is a
# case-insensitive substring search over title and section.
[filters.regions]
# Canada = ["canada", "ottawa", "toronto"]

[filters.topics]
# Motorsport = ["formula one", "grand prix"]

[colors]
active_border = "Cyan"
inactive_border = "DarkGray"
selection_bg = "Cyan"
selection_fg = "Black"
verified = "Green"
flagged = "Red"
fact_check = "Magenta"
metadata_section = "Yellow"
metadata_date = "Yellow"
metadata_link = "Blue"
fallback = "LightYellow"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
step_prev = ["h", "Left"]
step_next = ["l", "Right"]
next_pane = ["Tab"]
prev_pane = ["BackTab", "Shift+Tab"]
switch_view = ["a"]
toggle_expand = ["e"]
load_more = ["n", "PageDown"]
cycle_region = ["g"]
cycle_topic = ["t"]
cycle_verification = ["v"]
open_in_browser = ["o", "Enter"]
refresh = ["R", "F5"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.colors.active_border, ratatui::style::Color::Cyan);
        assert_eq!(config.keybindings.quit, vec!["q", "Ctrl+c"]);
        assert_eq!(config.refresh_interval().unwrap(), Duration::from_secs(10));
        assert_eq!(config.feeds.spotlight_categories.len(), 4);
        assert_eq!(config.window, WindowConfig::default());
        assert!(config.filters.regions.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[refresh]
interval = "1m"

[colors]
active_border = "#FF0000"

[filters.topics]
Motorsport = ["formula one"]
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.refresh_interval().unwrap(), Duration::from_secs(60));
        assert_eq!(config.refresh.min_busy_ms, DEFAULT_MIN_BUSY_MS);
        assert_eq!(
            config.colors.active_border,
            ratatui::style::Color::Rgb(255, 0, 0)
        );
        assert_eq!(
            config.colors.inactive_border,
            ratatui::style::Color::DarkGray
        );
        assert!(config.filter_engine().topics().get("motorsport").is_some());
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");

        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_minutes, 10);
        assert_eq!(config.coordinator_config().secondary_category, "News");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config: Config = toml::from_str("[refresh]\ninterval = \"often\"").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "refresh.interval", .. })
        ));

        let config: Config = toml::from_str("[cache]\nttl_minutes = 0").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[cache]\nttl_minutes = 1000000000000").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "cache.ttl_minutes", .. })
        ));

        let config: Config =
            toml::from_str("[refresh]\ninterval = \"18446744073709551615s\"").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[window]\npage_size = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"https://news.example.com/\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "https://news.example.com/");

        std::fs::write(&path, "[api\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
