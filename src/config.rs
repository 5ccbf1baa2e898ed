//! Device profile in `~/.config/sonicfg/config.toml`
//!
//! ```toml
//! [device]
//! host = "10.0.0.1"
//! username = "admin"
//! password = "YourPaSsWoRd"
//! verify_tls = false
//! timeout = 30
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 500
//! ```
//!
//! Command-line flags and `SONIC_*` environment variables win over the file.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use restconf::{ConnectionConfig, RetryConfig};
use serde::{Deserialize, Serialize};

use crate::cli::ConnectionArgs;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("sonicfg"))
}

/// Expand `~` and `$VARS` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceProfile,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_tls: bool,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: None,
            password: None,
            verify_tls: false,
            timeout: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let retry = RetryConfig::default();
        Self {
            max_attempts: retry.max_attempts,
            base_delay_ms: retry.base_delay.as_millis() as u64,
            backoff_factor: retry.backoff_factor,
            max_delay_ms: retry.max_delay.as_millis() as u64,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            backoff_factor: self.backoff_factor,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

impl Config {
    /// Load the config file; a missing default file is an empty config
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(path) => expand_path(path),
            None => {
                let path = config_dir()?.join("config.toml");
                if !path.exists() {
                    log::debug!("No config file at {}", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path).with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Connection settings with command-line flags applied over the profile
    pub fn connection(&self, args: &ConnectionArgs) -> Result<ConnectionConfig> {
        let Some(host) = args.host.clone().or_else(|| self.device.host.clone()) else {
            bail!("No switch given: pass --host, set SONIC_HOST, or set device.host in the config file");
        };

        let mut config = ConnectionConfig::new(host);
        config.port = args.port.or(self.device.port);
        if let Some(username) = args.username.clone().or_else(|| self.device.username.clone()) {
            config.username = username;
        }
        if let Some(password) = args.password.clone().or_else(|| self.device.password.clone()) {
            config.password = password;
        }
        config.verify_tls = args.verify_tls || self.device.verify_tls;
        config.timeout = Duration::from_secs(args.timeout.unwrap_or(self.device.timeout));
        Ok(config)
    }
}
