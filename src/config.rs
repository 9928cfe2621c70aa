//! Configuration management for wifilink

use crate::error::{WifiError, WifiResult};
use crate::validation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiConfig {
    /// Wireless interface to manage
    #[serde(default = "default_interface")]
    pub interface: String,
    /// wpa_supplicant configuration file that network blocks are appended to
    #[serde(default = "default_wpa_conf_path")]
    pub wpa_conf_path: PathBuf,
    /// Host pinged to verify connectivity
    #[serde(default = "default_ping_target")]
    pub ping_target: String,
    /// Echo requests per connectivity check
    #[serde(default = "default_ping_count")]
    pub ping_count: u32,
    /// Connectivity checks before `connect` gives up
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
    /// Delay between connectivity checks (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Delay between adapter state polls (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on waiting for the adapter to change state (milliseconds)
    #[serde(default = "default_adapter_timeout_ms")]
    pub adapter_timeout_ms: u64,
    /// Upper bound on adapter state polls per wait
    #[serde(default = "default_adapter_max_polls")]
    pub adapter_max_polls: u32,
    /// Prefix interface up/down with sudo
    #[serde(default = "default_use_sudo")]
    pub use_sudo: bool,
}

fn default_interface() -> String {
    "wlan0".to_string()
}

fn default_wpa_conf_path() -> PathBuf {
    PathBuf::from("/etc/wpa_supplicant/wpa_supplicant.conf")
}

fn default_ping_target() -> String {
    "1.1.1.1".to_string()
}

fn default_ping_count() -> u32 {
    4
}

fn default_connect_attempts() -> u32 {
    10
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_adapter_timeout_ms() -> u64 {
    30_000
}

fn default_adapter_max_polls() -> u32 {
    120
}

fn default_use_sudo() -> bool {
    true
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            wpa_conf_path: default_wpa_conf_path(),
            ping_target: default_ping_target(),
            ping_count: default_ping_count(),
            connect_attempts: default_connect_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            adapter_timeout_ms: default_adapter_timeout_ms(),
            adapter_max_polls: default_adapter_max_polls(),
            use_sudo: default_use_sudo(),
        }
    }
}

impl WifiConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> WifiResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| WifiError::Config(format!("Failed to read config: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| WifiError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> WifiResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| WifiError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| WifiError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Reject settings that would produce unsafe commands or unbounded loops
    pub fn validate(&self) -> WifiResult<()> {
        validation::validate_interface_name(&self.interface)?;
        validation::validate_hostname(&self.ping_target)?;

        if self.ping_count == 0 {
            return Err(WifiError::Config("ping_count must be at least 1".to_string()));
        }
        if self.connect_attempts == 0 {
            return Err(WifiError::Config(
                "connect_attempts must be at least 1".to_string(),
            ));
        }
        if self.adapter_max_polls == 0 {
            return Err(WifiError::Config(
                "adapter_max_polls must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }
}
