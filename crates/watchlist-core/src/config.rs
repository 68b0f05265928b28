//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/watchlist/config.toml)
//! 3. Environment variables (WATCHLIST_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Category;

/// Environment variable prefix
const ENV_PREFIX: &str = "WATCHLIST";

/// File name of the persisted snapshot (also the default export name)
pub const SNAPSHOT_FILE_NAME: &str = "watchlist.json";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (the persisted snapshot)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file (stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Quiet period before a search query is issued
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Maximum number of candidates kept after merging providers
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Category that new items land in when none is given
    #[serde(default = "default_category")]
    pub default_category: Category,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_file: None,
            search_debounce_ms: default_search_debounce_ms(),
            search_limit: default_search_limit(),
            default_category: default_category(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (WATCHLIST_DATA_DIR, WATCHLIST_LOG_FILE, ...)
    /// 2. Config file (~/.config/watchlist/config.toml or WATCHLIST_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path (e.g. `--config`)
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // Unparseable numbers are ignored rather than fatal
        if let Ok(val) = std::env::var(format!("{}_SEARCH_DEBOUNCE_MS", ENV_PREFIX)) {
            if let Ok(ms) = val.trim().parse() {
                self.search_debounce_ms = ms;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_SEARCH_LIMIT", ENV_PREFIX)) {
            if let Ok(limit) = val.trim().parse() {
                self.search_limit = limit;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_DEFAULT_CATEGORY", ENV_PREFIX)) {
            if let Ok(category) = val.parse() {
                self.default_category = category;
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with WATCHLIST_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("watchlist")
            .join("config.toml")
    }

    /// Get the path to the persisted snapshot
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE_NAME)
    }

    /// Search debounce as a duration
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("watchlist")
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_search_limit() -> usize {
    8
}

fn default_category() -> Category {
    Category::PlanningToWatch
}
