//! Configuration types for the logging subsystem.

use std::{path::PathBuf, time::Duration};

use dalink_config::LoggingConfig;
use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::format::FmtSpan;

use super::format_service_name;

/// Default prefix for rolling log files when none is configured.
const DEFAULT_LOG_FILE_PREFIX: &str = "dalink";

/// Stdout logging layer settings.
#[derive(Debug, Clone)]
pub struct StdoutConfig {
    pub json_format: bool,
    /// Span events to log.
    pub fmt_span: FmtSpan,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            fmt_span: FmtSpan::CLOSE,
        }
    }
}

/// Rolling file logging settings.
#[derive(Debug, Clone)]
pub struct FileLoggingConfig {
    pub directory: PathBuf,
    /// Base filename, e.g. "dalink" -> "dalink.2026-01-01".
    pub file_name_prefix: String,
    pub rotation: Rotation,
    pub json_format: bool,
}

impl FileLoggingConfig {
    pub fn new(directory: PathBuf, file_name_prefix: String) -> Self {
        Self {
            directory,
            file_name_prefix,
            rotation: Rotation::DAILY,
            json_format: false,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_json_format(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }
}

/// OTLP exporter settings.
#[derive(Debug, Clone)]
pub struct OtlpExportConfig {
    pub endpoint: String,
    /// Timeout for a single export request.
    pub timeout: Duration,
}

impl OtlpExportConfig {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenTelemetry resource attributes attached to exported spans.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub service_name: String,
    pub service_version: Option<String>,
    pub custom_attributes: Vec<KeyValue>,
}

impl ResourceConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            service_name,
            service_version: None,
            custom_attributes: Vec::new(),
        }
    }

    pub fn build_resource(&self) -> Resource {
        let mut attributes = vec![KeyValue::new("service.name", self.service_name.clone())];

        if let Some(version) = &self.service_version {
            attributes.push(KeyValue::new("service.version", version.clone()));
        }

        attributes.extend(self.custom_attributes.iter().cloned());

        Resource::new(attributes)
    }
}

/// Logger configuration consumed by [`init`](super::init).
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub resource: ResourceConfig,
    pub stdout: StdoutConfig,
    pub file: Option<FileLoggingConfig>,
    pub otlp: Option<OtlpExportConfig>,
}

impl LoggerConfig {
    pub fn new(service_name: String) -> Self {
        Self {
            resource: ResourceConfig::new(service_name),
            stdout: StdoutConfig::default(),
            file: None,
            otlp: None,
        }
    }

    /// Builds a logger configuration for `base_service` from the `[logging]`
    /// section of the node config.
    pub fn from_logging_config(base_service: &str, config: &LoggingConfig) -> Self {
        let service_name = format_service_name(base_service, config.service_label.as_deref());
        let json_format = config.json_format.unwrap_or(false);

        let mut logger = Self::new(service_name).with_json_logging(json_format);

        if let Some(dir) = &config.log_dir {
            let prefix = config
                .log_file_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_FILE_PREFIX.to_owned());
            logger = logger.with_file_logging(
                FileLoggingConfig::new(dir.clone(), prefix).with_json_format(json_format),
            );
        }

        if let Some(url) = &config.otlp_url {
            logger = logger.with_otlp(OtlpExportConfig::new(url.clone()));
        }

        logger
    }

    pub fn with_service_version(mut self, version: String) -> Self {
        self.resource.service_version = Some(version);
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.stdout.json_format = enabled;
        self
    }

    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file = Some(config);
        self
    }

    pub fn with_otlp(mut self, config: OtlpExportConfig) -> Self {
        self.otlp = Some(config);
        self
    }

    pub fn with_fmt_span(mut self, fmt_span: FmtSpan) -> Self {
        self.stdout.fmt_span = fmt_span;
        self
    }

    pub fn add_resource_attribute(mut self, key: &str, value: String) -> Self {
        self.resource
            .custom_attributes
            .push(KeyValue::new(key.to_owned(), value));
        self
    }
}
