//! Configuration for the reward validation service

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::validator::ValidationMode;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Growth (campaign) service
    pub growth_server_url: Option<String>,

    // Validation
    #[serde(default = "default_validation_mode")]
    pub validation_mode: String,

    // Catalog refresh schedule
    #[serde(default = "default_refresh_interval")]
    pub catalog_refresh_interval_secs: u64,

    // HTTP transport
    #[serde(default = "default_request_timeout")]
    pub http_request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub http_connect_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub http_max_retries: u32,

    // Metrics server
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_validation_mode() -> String {
    "strict".to_string()
}

fn default_refresh_interval() -> u64 {
    300 // 5 minutes
}

fn default_request_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_max_retries() -> u32 {
    2
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            growth_server_url: None,
            validation_mode: default_validation_mode(),
            catalog_refresh_interval_secs: default_refresh_interval(),
            http_request_timeout_secs: default_request_timeout(),
            http_connect_timeout_secs: default_connect_timeout(),
            http_max_retries: default_max_retries(),
            metrics_port: default_metrics_port(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Validates the configuration
    ///
    /// A missing growth server URL is allowed: catalog refresh logs it and
    /// the catalog stays empty.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref endpoint) = self.growth_server_url {
            url::Url::parse(endpoint).map_err(|e| {
                anyhow::anyhow!("GROWTH_SERVER_URL is not a valid URL ({}): {}", endpoint, e)
            })?;
        }

        self.validation_mode()?;

        if self.catalog_refresh_interval_secs == 0 {
            anyhow::bail!("CATALOG_REFRESH_INTERVAL_SECS must be greater than zero");
        }

        Ok(())
    }

    /// Parsed validation mode
    pub fn validation_mode(&self) -> Result<ValidationMode> {
        Ok(self.validation_mode.parse()?)
    }

    /// Checks if the growth service endpoint is configured
    pub fn has_growth_server(&self) -> bool {
        self.growth_server_url.is_some()
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.catalog_refresh_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert!(config.growth_server_url.is_none());
        assert_eq!(config.catalog_refresh_interval_secs, 300);
        assert_eq!(config.http_max_retries, 2);
        assert_eq!(config.validation_mode().unwrap(), ValidationMode::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = Config {
            growth_server_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_mode() {
        let config = Config {
            validation_mode: "lenient".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_always_valid_mode_is_explicit() {
        let config = Config {
            growth_server_url: Some("http://localhost:4008/graphql".to_string()),
            validation_mode: "always_valid".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.has_growth_server());
        assert_eq!(config.validation_mode().unwrap(), ValidationMode::AlwaysValid);
    }
}
