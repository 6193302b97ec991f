//! Configuration management for rpmgate.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Result, RpmGateError};

/// Prefix for environment variable overrides, e.g. `RPMGATE__LIMITER__MAX_RPM`.
const ENV_PREFIX: &str = "RPMGATE";

/// Main configuration for rpmgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpmGateConfig {
    /// Limiter configuration
    #[serde(default)]
    pub limiter: LimiterConfig,
}

/// Limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum number of gated calls per 60-second window
    #[serde(default = "default_max_rpm")]
    pub max_rpm: f64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            max_rpm: default_max_rpm(),
        }
    }
}

fn default_max_rpm() -> f64 {
    60.0
}

impl LimiterConfig {
    /// Check that the configured rate yields a usable interval.
    pub fn validate(&self) -> Result<()> {
        crate::ratelimit::interval_for_rpm(self.max_rpm).map(|_| ())
    }
}

impl RpmGateConfig {
    /// Load configuration from an optional file, then apply environment overrides.
    ///
    /// The rate is not validated here so that callers can still override it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(RpmGateError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file not found: {}", path.display()),
                )));
            }
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: RpmGateConfig = serde_yaml::from_str(yaml)
            .map_err(|e| RpmGateError::Config(format!("Failed to parse config: {}", e)))?;
        config.limiter.validate()?;
        Ok(config)
    }
}
