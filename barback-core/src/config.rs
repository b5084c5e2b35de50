//! Barback configuration
//!
//! Loaded from `config.yaml` in the user config directory, or from an
//! explicit path. A missing file means defaults.
//!
//! ```yaml
//! provider:
//!   base_url: https://www.thecocktaildb.com/api/json/v1/1
//!   timeout_seconds: 30
//! browse:
//!   initial_letters: [a, b, c]
//!   page_size: 12
//!   search_debounce_ms: 400
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::catalog::DEFAULT_PAGE_SIZE;

/// Default provider endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.thecocktaildb.com/api/json/v1/1";

/// Requests shorter than this are not worth attempting
pub const MIN_TIMEOUT_SECONDS: u64 = 5;

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Remote provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ProviderConfig {
    /// Request timeout, raised to the minimum if configured lower
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout_seconds < MIN_TIMEOUT_SECONDS {
            warn!(
                "Configured timeout_seconds={} is too low; using minimum of {} seconds",
                self.timeout_seconds, MIN_TIMEOUT_SECONDS
            );
            Duration::from_secs(MIN_TIMEOUT_SECONDS)
        } else {
            Duration::from_secs(self.timeout_seconds)
        }
    }
}

/// Browsing defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseSettings {
    /// Letters fetched to populate the initial catalog
    #[serde(default = "default_initial_letters")]
    pub initial_letters: Vec<String>,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Quiet period before a typed search is sent
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

fn default_initial_letters() -> Vec<String> {
    vec!["a".to_string(), "b".to_string(), "c".to_string()]
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_search_debounce_ms() -> u64 {
    400
}

impl Default for BrowseSettings {
    fn default() -> Self {
        Self {
            initial_letters: default_initial_letters(),
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl BrowseSettings {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarbackConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub browse: BrowseSettings,
}

impl BarbackConfig {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from_path(&path)
    }

    /// Load from a specific path; defaults if the file does not exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Self = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as YAML, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).context("Failed to serialize config")
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let url = self.provider.base_url.trim();
        if url.is_empty() {
            anyhow::bail!("provider.base_url must not be empty");
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("provider.base_url must start with http:// or https://");
        }

        if self.browse.page_size == 0 {
            anyhow::bail!("browse.page_size must be greater than zero");
        }

        if let Some(bad) = self
            .browse
            .initial_letters
            .iter()
            .find(|l| l.chars().count() != 1)
        {
            anyhow::bail!("browse.initial_letters entries must be single characters, got '{bad}'");
        }

        Ok(())
    }

    /// `<config dir>/config.yaml`
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    fn config_dir() -> Result<PathBuf> {
        directories::ProjectDirs::from("dev", "barback", "barback")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("barback")))
            .context("Could not determine config directory")
    }
}
