//! Gateway configuration.
//!
//! Assembled by an external loader (TOML file in the CLI); the core only
//! defines the shape and defaults.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Configuration for one gateway instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Device network address (host name or IP).
    pub host: String,
    /// Request scheme (http or https).
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Comma-separated inverter device ids (e.g. "1,2").
    #[serde(default)]
    pub inverter_ids: String,
    /// Comma-separated meter device ids.
    #[serde(default)]
    pub meter_ids: String,
    /// Comma-separated storage device ids.
    #[serde(default)]
    pub storage_ids: String,
    /// Poll interval for live telemetry, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Poll interval for historical/archive telemetry, in seconds.
    #[serde(default = "default_archive_interval")]
    pub archive_interval: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// State database path; in-memory store when unset.
    pub db_path: Option<String>,
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_archive_interval() -> u64 {
    150
}

fn default_timeout() -> u64 {
    10
}

impl GatewayConfig {
    /// Create a configuration for the given host with defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            scheme: default_scheme(),
            inverter_ids: String::new(),
            meter_ids: String::new(),
            storage_ids: String::new(),
            poll_interval: default_poll_interval(),
            archive_interval: default_archive_interval(),
            timeout: default_timeout(),
            db_path: None,
        }
    }

    /// Base URL for API requests, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host.trim_end_matches('/'))
    }

    /// Parse a comma-separated id list, skipping empty entries.
    pub fn parse_ids(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Inverter device ids.
    pub fn inverters(&self) -> Vec<String> {
        Self::parse_ids(&self.inverter_ids)
    }

    /// Meter device ids.
    pub fn meters(&self) -> Vec<String> {
        Self::parse_ids(&self.meter_ids)
    }

    /// Storage device ids.
    pub fn storages(&self) -> Vec<String> {
        Self::parse_ids(&self.storage_ids)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), Error> {
        if self.host.trim().is_empty() {
            return Err(Error::Configuration("host must not be empty".into()));
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(Error::Configuration(format!(
                "unsupported scheme: {}",
                self.scheme
            )));
        }
        if self.poll_interval == 0 || self.archive_interval == 0 {
            return Err(Error::Configuration(
                "poll intervals must be at least 1 second".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: GatewayConfig = toml::from_str(r#"host = "192.168.1.50""#).unwrap();
        assert_eq!(config.scheme, "http");
        assert_eq!(config.poll_interval, 10);
        assert_eq!(config.archive_interval, 150);
        assert_eq!(config.timeout, 10);
        assert!(config.inverters().is_empty());
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(GatewayConfig::parse_ids("1,2"), vec!["1", "2"]);
        assert_eq!(GatewayConfig::parse_ids(" 1 , , 3 "), vec!["1", "3"]);
        assert!(GatewayConfig::parse_ids("").is_empty());
    }

    #[test]
    fn test_base_url() {
        let mut config = GatewayConfig::new("pv.local/");
        assert_eq!(config.base_url(), "http://pv.local");
        config.scheme = "https".into();
        assert_eq!(config.base_url(), "https://pv.local");
    }

    #[test]
    fn test_validate() {
        assert!(GatewayConfig::new("pv.local").validate().is_ok());
        assert!(GatewayConfig::new("").validate().is_err());

        let mut config = GatewayConfig::new("pv.local");
        config.scheme = "ftp".into();
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::new("pv.local");
        config.poll_interval = 0;
        assert!(config.validate().is_err());
    }
}
