//! Configuration for the client connection.
//!
//! This module reads configuration from an optional YAML file and
//! environment variables, providing defaults that match the deployed
//! protocol (two-minute whitespace keepalive).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Client connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Seconds between whitespace keepalives while push is enabled; 0 disables
    pub ping_timeout: u32,
    /// Seconds to wait for the out-of-band rebind reply
    pub response_timeout: u32,
    /// Whether to attempt rebind at all; a policy knob, not a capability
    pub use_rebind: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ping_timeout: 120,
            response_timeout: 30,
            use_rebind: true,
        }
    }
}

impl ClientConfig {
    /// Load configuration from file and environment variables
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config = Self::default();

        if let Ok(content) = std::fs::read_to_string(&config_path) {
            match serde_yaml::from_str::<ClientConfig>(&content) {
                Ok(parsed) => {
                    config = parsed;
                    info!("Loaded configuration from {:?}", config_path.as_ref());
                }
                Err(e) => {
                    warn!(
                        "Failed to parse config file {:?} ({}), using defaults",
                        config_path.as_ref(),
                        e
                    );
                }
            }
        } else {
            warn!(
                "Config file {:?} not found, using defaults",
                config_path.as_ref()
            );
        }

        config.apply_environment_overrides();

        info!(
            "Final client configuration: ping_timeout={}s, response_timeout={}s, use_rebind={}",
            config.ping_timeout, config.response_timeout, config.use_rebind
        );

        Ok(config)
    }

    /// Override fields from `P1_*` environment variables
    pub fn apply_environment_overrides(&mut self) {
        if let Some(value) = env_parse::<u32>("P1_PING_TIMEOUT") {
            self.ping_timeout = value;
        }
        if let Some(value) = env_parse::<u32>("P1_RESPONSE_TIMEOUT") {
            self.response_timeout = value;
        }
        if let Some(value) = env_parse::<bool>("P1_USE_REBIND") {
            self.use_rebind = value;
        }
    }

    /// Keepalive interval as a duration
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.ping_timeout))
    }

    /// Rebind reply wait bound as a duration
    pub fn response_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.response_timeout))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unparsable {} value {:?}", name, raw);
                None
            }
        },
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.ping_timeout, 120);
        assert_eq!(config.response_timeout, 30);
        assert!(config.use_rebind);
        assert_eq!(config.ping_interval(), Duration::from_secs(120));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = ClientConfig {
            ping_timeout: 60,
            response_timeout: 10,
            use_rebind: false,
        };

        let rendered = serde_yaml::to_string(&config).unwrap();
        let parsed: ClientConfig = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed.ping_timeout, 60);
        assert_eq!(parsed.response_timeout, 10);
        assert!(!parsed.use_rebind);
    }
}
