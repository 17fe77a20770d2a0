// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardbarn-rs

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Application version
    pub version: String,

    /// Log level
    pub log_level: String,

    /// Enable demo mode (simulated actuators)
    pub demo_mode: bool,

    /// Operator-tunable response policy
    pub system: SystemConfig,

    /// Service failover configuration
    pub failover: FailoverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "WardBarn".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            demo_mode: true,
            system: SystemConfig::default(),
            failover: FailoverConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            // Create parent directories
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("wardbarn"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Operator-tunable response policy knobs.
///
/// `enable_emergency_override` and `enable_auto_recovery` drive engine
/// behavior; the numeric limits are carried for the report/config contract
/// and future handlers (no handler currently enforces retries or timeouts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Maximum response time in seconds
    pub max_response_time_secs: u16,

    /// Maximum number of retry attempts
    pub max_retry_attempts: u8,

    /// Allow the emergency override path
    pub enable_emergency_override: bool,

    /// Chain a full recovery after an emergency lockdown completes
    pub enable_auto_recovery: bool,

    /// Health check interval in seconds
    pub health_check_interval_secs: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_response_time_secs: 300,
            max_retry_attempts: 3,
            enable_emergency_override: true,
            enable_auto_recovery: false,
            health_check_interval_secs: 30,
        }
    }
}

impl SystemConfig {
    /// Reject configurations the engine cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_response_time_secs == 0 {
            return Err(ConfigError::ZeroResponseTime);
        }
        if self.health_check_interval_secs == 0 {
            return Err(ConfigError::ZeroHealthInterval);
        }
        Ok(())
    }
}

/// Critical service failover configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverConfig {
    /// Ordered list of critical services with hot backups
    pub critical_services: Vec<String>,

    /// Settle delay between per-service failovers, in milliseconds
    pub settle_ms: u64,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            critical_services: vec![
                "wardbarn-core".to_string(),
                "auth-service".to_string(),
                "network-monitor".to_string(),
                "facility-db".to_string(),
            ],
            settle_ms: 500,
        }
    }
}

/// Rejected configuration updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_response_time_secs` was zero
    #[error("max_response_time_secs must be non-zero")]
    ZeroResponseTime,

    /// `health_check_interval_secs` was zero
    #[error("health_check_interval_secs must be non-zero")]
    ZeroHealthInterval,
}
