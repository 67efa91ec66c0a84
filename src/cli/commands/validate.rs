//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the exporter configuration file.

use crate::config::{load_config, SurfaceTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match config.validate() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Log Level: {}", config.application.log_level);
                match config.surface.target {
                    SurfaceTarget::WebDriver => {
                        println!("  Surface: WebDriver ({})", config.webdriver.url);
                        println!("  Browser: {}", config.webdriver.browser);
                        if let Some(dir) = &config.webdriver.user_data_dir {
                            println!("  Profile: {dir}");
                        }
                    }
                    SurfaceTarget::Simulated => {
                        println!(
                            "  Surface: simulated ({} items)",
                            config.simulated.sections.iter().map(|&n| n as u64).sum::<u64>()
                        );
                    }
                }
                println!("  List: {}", config.list.root_url);
                println!("  Strategy: {:?}", config.traversal.strategy);
                println!("  Window cap: {}", config.traversal.window_cap);
                println!("  Batch size: {}", config.export.batch_size);
                println!("  Max attempts: {}", config.export.max_attempts);
                println!(
                    "  Recovery: {}",
                    if config.recovery.enabled { "enabled" } else { "disabled" }
                );
                println!(
                    "  Checkpoints: {}",
                    if config.state.enable_checkpointing {
                        config.state.checkpoint_path.as_str()
                    } else {
                        "disabled"
                    }
                );
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_accepts_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[export]\nbatch_size = 40").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_validate_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[export]\nbatch_size = 0").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
