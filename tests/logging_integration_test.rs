//! Integration tests for logging configuration and helper macros

use gallery_export::config::{parse_config, LoggingConfig};
use gallery_export::domain::{ExporterError, GlobalIndex};
use gallery_export::{log_batch_start, log_error_with_context, log_export_complete, log_retry_attempt};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.local_path, "logs");
}

#[test]
fn test_logging_section_is_parsed() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");
    let toml = format!(
        "[logging]\nlocal_enabled = true\nlocal_path = \"{}\"\nlocal_rotation = \"never\"\n",
        log_path.display()
    );

    let config = parse_config(&toml).unwrap();

    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "never");
    // Created by init_logging, not by parsing
    assert!(!log_path.exists());
}

#[test]
fn test_invalid_rotation_is_rejected() {
    let err = parse_config("[logging]\nlocal_rotation = \"weekly\"\n").unwrap_err();
    assert!(err.to_string().contains("local_rotation"));
}

#[test]
fn test_logging_macros_without_subscriber() {
    let error = ExporterError::Fatal("retries exhausted".to_string());

    log_batch_start!(1, GlobalIndex::new(40), 40);
    log_retry_attempt!(2, 3, "unknown confirmation");
    log_error_with_context!(&error, "Batch failed");
    log_export_complete!(80, Duration::from_secs(12));
}
