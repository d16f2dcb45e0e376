//! Application configuration management.
//!
//! This module handles loading and saving the console configuration: which
//! API to talk to, how long cached lists stay fresh, and how often `watch`
//! refreshes in the background.
//!
//! Configuration is stored at `~/.config/guardpost/config.json`. Every field
//! is optional; missing fields fall back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_BASE_URL, REQUEST_TIMEOUT_SECS};
use crate::cache::DEFAULT_FRESHNESS_MINUTES;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "guardpost";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured API base URL
pub const API_URL_ENV: &str = "GUARDPOST_API_URL";

const DEFAULT_REFRESH_INTERVAL_MINUTES: u64 = 5;

/// Upper bound for any configured window (one year).
const MAX_WINDOW_MINUTES: u64 = 60 * 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub freshness_minutes: Option<i64>,
    pub refresh_interval_minutes: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Base URL, with `GUARDPOST_API_URL` taking precedence over the file.
    pub fn api_base_url(&self) -> String {
        self.base_url_with_override(std::env::var(API_URL_ENV).ok())
    }

    fn base_url_with_override(&self, env: Option<String>) -> String {
        env.filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Out-of-range values (zero, negative, or over a year) use the default.
    pub fn freshness(&self) -> chrono::Duration {
        let minutes = self
            .freshness_minutes
            .filter(|m| *m > 0 && *m <= MAX_WINDOW_MINUTES as i64)
            .unwrap_or(DEFAULT_FRESHNESS_MINUTES);
        chrono::Duration::try_minutes(minutes)
            .unwrap_or_else(|| chrono::Duration::minutes(DEFAULT_FRESHNESS_MINUTES))
    }

    pub fn refresh_interval(&self) -> StdDuration {
        let minutes = self
            .refresh_interval_minutes
            .filter(|m| *m > 0 && *m <= MAX_WINDOW_MINUTES)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_MINUTES);
        StdDuration::from_secs(minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> StdDuration {
        let secs = self
            .request_timeout_secs
            .filter(|s| *s > 0 && *s <= MAX_WINDOW_MINUTES * 60)
            .unwrap_or(REQUEST_TIMEOUT_SECS);
        StdDuration::from_secs(secs)
    }
}
