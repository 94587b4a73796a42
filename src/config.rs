//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! field has a default, so a partial (or missing) file is valid.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::types::ScanError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub scan: ScanConfig,
    pub server: ServerConfig,
}

/// Upstream access and throttling.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    pub platform: String,
    pub language: String,
    pub user_agent: String,
    /// Pause after every successful request.
    pub request_delay_secs: f64,
    /// Cooldown after a 429.
    pub rate_limit_delay_secs: f64,
    /// Pause after a transient failure.
    pub retry_delay_secs: f64,
    /// Total attempts per request, excluding rate-limited ones.
    pub max_attempts: u32,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.warframe.market/v2".to_string(),
            platform: "pc".to_string(),
            language: "en".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            request_delay_secs: 0.35,
            rate_limit_delay_secs: 10.0,
            retry_delay_secs: 2.0,
            max_attempts: 5,
            timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.request_delay_secs)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_secs_f64(self.rate_limit_delay_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Evaluation thresholds and scheduling.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    /// Minimum `set_price - parts` for a set to be recorded.
    pub min_arbitrage_value: i64,
    pub rescan_interval_secs: u64,
    /// Granularity of the inter-cycle wait (bounds shutdown latency).
    pub tick_millis: u64,
    /// Minimum units listed for the set itself, if set.
    pub min_set_volume: Option<u64>,
    /// Public item page prefix used for `market_url`.
    pub market_url_base: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_arbitrage_value: 10,
            rescan_interval_secs: 600,
            tick_millis: 1000,
            min_set_volume: None,
            market_url_base: "https://warframe.market/items".to_string(),
        }
    }
}

impl ScanConfig {
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_secs(self.rescan_interval_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {path}"))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that would stall or spin the scanner.
    pub fn validate(&self) -> std::result::Result<(), ScanError> {
        let f = &self.fetch;
        if f.max_attempts == 0 {
            return Err(ScanError::Config("fetch.max_attempts must be >= 1".into()));
        }
        if f.timeout_secs == 0 {
            return Err(ScanError::Config("fetch.timeout_secs must be >= 1".into()));
        }
        for (name, value) in [
            ("fetch.request_delay_secs", f.request_delay_secs),
            ("fetch.rate_limit_delay_secs", f.rate_limit_delay_secs),
            ("fetch.retry_delay_secs", f.retry_delay_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScanError::Config(format!("{name} must be a non-negative number")));
            }
        }
        if self.scan.tick_millis == 0 {
            return Err(ScanError::Config("scan.tick_millis must be >= 1".into()));
        }
        Ok(())
    }
}
