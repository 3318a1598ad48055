//! Configuration for the peer endpoint

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "peers.toml";

/// Prefix for environment overrides (`PEERS_MINIMUM_CLUSTER_SIZE=5`)
pub const ENV_PREFIX: &str = "PEERS";

/// MySQL InnoDB Cluster is only viable with three members or more
pub const MINIMUM_CLUSTER_SIZE: usize = 3;

/// Global configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Peer endpoint name, used to namespace condition flags
    #[serde(default = "default_endpoint_name")]
    pub endpoint_name: String,

    /// Members needed (this unit included) before any condition can hold
    #[serde(default = "default_minimum_cluster_size")]
    pub minimum_cluster_size: usize,

    /// Address published to peers; resolved from the local route when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_address: Option<IpAddr>,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_endpoint_name() -> String {
    "cluster".to_string()
}
fn default_minimum_cluster_size() -> usize {
    MINIMUM_CLUSTER_SIZE
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_name: default_endpoint_name(),
            minimum_cluster_size: default_minimum_cluster_size(),
            ingress_address: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load from `peers.toml` (if present) and `PEERS_*` environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE, ENV_PREFIX)
    }

    /// Load from an explicit file and environment prefix.
    ///
    /// The file is optional; environment values win over file values.
    pub fn load_from(path: impl AsRef<Path>, env_prefix: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint_name.trim().is_empty() {
            return Err(Error::InvalidConfig("endpoint_name cannot be empty".into()));
        }

        if self.minimum_cluster_size < MINIMUM_CLUSTER_SIZE {
            return Err(Error::InvalidConfig(format!(
                "minimum_cluster_size must be at least {}, got {}",
                MINIMUM_CLUSTER_SIZE, self.minimum_cluster_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint_name, "cluster");
        assert_eq!(config.minimum_cluster_size, 3);
        assert!(config.ingress_address.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_small_cluster() {
        let config = Config {
            minimum_cluster_size: 2,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let config = Config {
            endpoint_name: "  ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            Config::load_from("/nonexistent/peers.toml", "PEERS_TEST_MISSING_FILE").unwrap();
        assert_eq!(config, Config::default());
    }
}
