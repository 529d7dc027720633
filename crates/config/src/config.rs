use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    da::DaServerConfig,
    derivation::{DerivationConfig, ReaderConfig},
    txmgr::{QueueConfig, QueueConfigError},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid queue config: {0}")]
    Queue(#[from] QueueConfigError),
}

/// Logging configuration for file output, OpenTelemetry and formatting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Service label to append to the service name (e.g., "prod", "dev").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,

    /// OpenTelemetry OTLP endpoint URL for distributed tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otlp_url: Option<String>,

    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    pub da_server: DaServerConfig,
    pub derivation: DerivationConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parses and validates a TOML config.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.queue.validate()?;
        Ok(config)
    }
}
