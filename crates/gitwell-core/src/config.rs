//! Configuration management for GitWell

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cache::DEFAULT_TTL_SECS;

/// When to emit ANSI colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Global GitWell configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Days covered by the daily commit series
    #[serde(default = "default_trend_days")]
    pub trend_days: u32,

    /// Days to extrapolate in forecasts
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,

    /// Window for smoothing series
    #[serde(default = "default_moving_average_window")]
    pub moving_average_window: usize,

    /// Snapshot cache lifetime (seconds)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,

    #[serde(default)]
    pub color: ColorMode,
}

fn default_trend_days() -> u32 {
    30
}

fn default_forecast_days() -> u32 {
    30
}

fn default_moving_average_window() -> usize {
    7
}

fn default_cache_ttl_secs() -> i64 {
    DEFAULT_TTL_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trend_days: default_trend_days(),
            forecast_days: default_forecast_days(),
            moving_average_window: default_moving_average_window(),
            cache_ttl_secs: default_cache_ttl_secs(),
            color: ColorMode::default(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            let config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", path))?;
            Ok(config)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
