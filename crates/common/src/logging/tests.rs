use std::path::PathBuf;

use dalink_config::LoggingConfig;

use super::{types::*, *};

#[test]
fn test_format_service_name() {
    assert_eq!(format_service_name("dalink-batcher", None), "dalink-batcher");
    assert_eq!(
        format_service_name("dalink-batcher", Some("prod")),
        "dalink-batcher%prod"
    );
}

#[test]
fn test_resource_config_build() {
    let mut config = ResourceConfig::new("test-service".to_owned());
    config.service_version = Some("1.0.0".to_owned());
    let resource = config.build_resource();
    let attrs: Vec<_> = resource.iter().collect();

    assert!(attrs
        .iter()
        .any(|(key, value)| key.as_str() == "service.name" && value.as_str() == "test-service"));
    assert!(attrs
        .iter()
        .any(|(key, value)| key.as_str() == "service.version" && value.as_str() == "1.0.0"));
}

#[test]
fn test_from_logging_config_minimal() {
    let config = LoggerConfig::from_logging_config("dalink", &LoggingConfig::default());

    assert_eq!(config.resource.service_name, "dalink");
    assert!(!config.stdout.json_format);
    assert!(config.file.is_none());
    assert!(config.otlp.is_none());
}

#[test]
fn test_from_logging_config_full() {
    let logging = LoggingConfig {
        service_label: Some("dev".to_owned()),
        otlp_url: Some("http://localhost:4317".to_owned()),
        log_dir: Some(PathBuf::from("/var/log/dalink")),
        log_file_prefix: None,
        json_format: Some(true),
    };

    let config = LoggerConfig::from_logging_config("dalink-derive", &logging);

    assert_eq!(config.resource.service_name, "dalink-derive%dev");
    assert!(config.stdout.json_format);

    let file = config.file.expect("file logging configured");
    assert_eq!(file.directory, PathBuf::from("/var/log/dalink"));
    assert_eq!(file.file_name_prefix, "dalink");
    assert!(file.json_format);

    assert_eq!(
        config.otlp.map(|o| o.endpoint).as_deref(),
        Some("http://localhost:4317")
    );
}

#[test]
fn test_file_logging_builder() {
    let dir = tempfile::tempdir().unwrap();
    let file = FileLoggingConfig::new(dir.path().to_path_buf(), "queue".to_owned())
        .with_rotation(Rotation::HOURLY)
        .with_json_format(true);

    let config = LoggerConfig::new("svc".to_owned())
        .with_file_logging(file)
        .add_resource_attribute("region", "eu".to_owned());

    assert_eq!(config.file.as_ref().unwrap().file_name_prefix, "queue");
    assert!(config.file.as_ref().unwrap().json_format);
    assert_eq!(config.resource.custom_attributes.len(), 1);
}
