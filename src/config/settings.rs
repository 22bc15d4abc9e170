/// Service configuration structures
///
/// Settings load from a TOML file when present and fall back to defaults
/// otherwise, so the service always boots. The Zerion API key can also be
/// supplied through the `ZERION_API_KEY` environment variable, which wins
/// over the file.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const ZERION_API_KEY_ENV: &str = "ZERION_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub zerion: ZerionConfig,
    pub refresh: RefreshConfig,
}

/// Vendor API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ZerionConfig {
    /// API key; when unset the service runs entirely on synthetic data
    pub api_key: Option<String>,

    /// Base endpoint of the Zerion REST API
    pub api_base: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// How long a key-validity probe result stays cached, in seconds
    pub key_check_interval_secs: u64,
}

impl Default for ZerionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.zerion.io/v1".to_string(),
            request_timeout_secs: 5,
            key_check_interval_secs: 300,
        }
    }
}

/// Background refresh cadence and fan-out limits
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between leaderboard refresh cycles
    pub interval_secs: u64,

    /// Maximum wallet fetches in flight during a cycle
    pub max_concurrent_fetches: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            max_concurrent_fetches: 4,
        }
    }
}

impl ArenaConfig {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ArenaConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load the config file when it exists, otherwise run on defaults
    pub fn load_or_default(path: &str) -> Self {
        if Path::new(path).exists() {
            match Self::load_from_file(path) {
                Ok(config) => {
                    info!(path, "📋 Loaded configuration file");
                    return config;
                }
                Err(e) => {
                    warn!(path, error = %e, "⚠️ Failed to parse config, using defaults");
                }
            }
        } else {
            info!(path, "📋 No config file found, using defaults");
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ZERION_API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.zerion.api_key = Some(key);
            }
        }
    }
}
