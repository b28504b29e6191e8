//! Configuration management for the consumer client.
//!
//! This module provides configuration loading with multiple sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! Environment variables take precedence over config file values, which take
//! precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use netmodel_client::config::ClientConfig;
//!
//! // Load from file with env overrides
//! let config = ClientConfig::load("netmodel.yaml")?;
//!
//! // Or load from environment only
//! let config = ClientConfig::from_env()?;
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use netmodel_domain::model::HierarchySelection;

use crate::handlers::batch::MAX_BATCH_SIZE;

/// Client configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ClientConfig {
    /// Exchange and resolution settings
    #[serde(default)]
    pub client: ClientSettings,

    /// Hierarchy levels requested by container assembly
    #[serde(default)]
    pub hierarchy: HierarchySelection,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Exchange and resolution settings.
///
/// Overridable with `NETMODEL_CLIENT__<KEY>`, e.g.
/// `NETMODEL_CLIENT__BATCH_SIZE=500`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClientSettings {
    /// Identifiers per outgoing message (1..=1000)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Upper bound on any single public operation, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Resolution passes before giving up
    #[serde(default = "default_max_resolution_passes")]
    pub max_resolution_passes: u32,

    /// Responses buffered between the transport worker and the caller
    #[serde(default = "default_response_buffer")]
    pub response_buffer: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            request_timeout_secs: default_request_timeout(),
            max_resolution_passes: default_max_resolution_passes(),
            response_buffer: default_response_buffer(),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_resolution_passes() -> u32 {
    100
}

fn default_response_buffer() -> usize {
    256
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

const ENV_PREFIX: &str = "NETMODEL";

fn environment() -> Environment {
    // NETMODEL_CLIENT__BATCH_SIZE -> client.batch_size
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

impl ClientConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `NETMODEL_` and use `__` as
    /// the nested key separator.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            .add_source(Config::try_from(&ClientConfig::default())?)
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(environment())
            .build()?;

        let client_config: ClientConfig = config.try_deserialize()?;
        client_config.validate()?;

        Ok(client_config)
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&ClientConfig::default())?)
            .add_source(environment())
            .build()?;

        let client_config: ClientConfig = config.try_deserialize()?;
        client_config.validate()?;

        Ok(client_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.client.batch_size) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "client.batch_size must be between 1 and {MAX_BATCH_SIZE}, got: {}",
                    self.client.batch_size
                ),
            });
        }

        if self.client.request_timeout_secs == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "client.request_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.client.max_resolution_passes == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "client.max_resolution_passes must be greater than 0".to_string(),
            });
        }

        if self.client.response_buffer == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "client.response_buffer must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        Ok(())
    }
}
