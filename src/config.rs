//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `flora.toml`.
//!     loads configuration from file or falls back to defaults, then lets
//!     the environment (and a local .env) override the relay credentials.
//!
//! structure:
//!     - ServerConfig: where the dashboard listens.
//!     - RelayConfig: Blynk base url, auth token and per-pin deadline.
//!     - PollingConfig: how often the dashboard page re-polls.
//!     - LoggingConfig: log level and whether to echo readings.
//!
//! ==============================================================================

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::error::ConfigError;
use crate::relay::{AUTH_TOKEN_VAR, BASE_URL_VAR};

/// explicit config path override
pub const CONFIG_PATH_VAR: &str = "FLORA_CONFIG";

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HostConfig {
    pub server: ServerConfig,
    pub relay: RelayConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RelayConfig {
    pub base_url: String,
    pub auth_token: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub show_sensor_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:3000".to_string() }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_token: String::new(),
            timeout_ms: 3000,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_seconds: 5 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), show_sensor_data: false }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// token with all but the last four characters hidden
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.auth_token.chars().collect();
        if chars.is_empty() {
            return "<unset>".to_string();
        }
        let visible = chars.len().saturating_sub(4);
        chars
            .iter()
            .enumerate()
            .map(|(i, c)| if i < visible { '*' } else { *c })
            .collect()
    }
}

impl HostConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `FLORA_CONFIG` or the usual locations, fall back to
    /// defaults, then apply environment overrides.
    pub fn load_or_default() -> Self {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();

        let mut config = Self::load_from_paths(&Self::search_paths());
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn search_paths() -> Vec<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_VAR) {
            return vec![PathBuf::from(explicit)];
        }
        vec![
            PathBuf::from("config").join("flora.toml"),
            PathBuf::from("..").join("config").join("flora.toml"),
        ]
    }

    fn load_from_paths(paths: &[PathBuf]) -> Self {
        for path in paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        info!("[CONFIG] Loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("[CONFIG] Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        warn!("[CONFIG] No config file found - using defaults");
        Self::default()
    }

    /// Non-empty `BLYNK_BASE_URL` / `BLYNK_AUTH_TOKEN` win over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(BASE_URL_VAR) {
            self.relay.base_url = url;
        }
        if let Some(token) = non_empty(AUTH_TOKEN_VAR) {
            self.relay.auth_token = token;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.timeout_ms == 0 {
            return Err(ConfigError::Invalid("relay.timeout_ms must be greater than 0".into()));
        }
        if self.polling.interval_seconds == 0 {
            return Err(ConfigError::Invalid("polling.interval_seconds must be greater than 0".into()));
        }
        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_addr.parse().map_err(|e| {
            ConfigError::Invalid(format!("server.bind_addr '{}': {}", self.server.bind_addr, e))
        })
    }

    /// Log configuration summary
    pub fn print_summary(&self) {
        info!("┌─────────────────────────────────────────┐");
        info!("│           HOST CONFIGURATION            │");
        info!("├─────────────────────────────────────────┤");
        info!("│ Bind: {}", self.server.bind_addr);
        info!("│ Relay: {}", if self.relay.base_url.is_empty() { "<unset>" } else { self.relay.base_url.as_str() });
        info!("│ Token: {}", self.relay.masked_token());
        info!("│ Channel Timeout: {}ms", self.relay.timeout_ms);
        info!("│ Refresh Interval: {}s", self.polling.interval_seconds);
        info!("│ Log Level: {}", self.logging.level);
        info!("└─────────────────────────────────────────┘");
    }
}
