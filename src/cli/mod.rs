//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the exporter using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Gallery Export - bulk exporter for virtualized gallery lists
#[derive(Parser, Debug)]
#[command(name = "gallery-export")]
#[command(version, about, long_about = None)]
#[command(author = "Gallery Export Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "gallery-export.toml",
        env = "GALLERY_EXPORT_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GALLERY_EXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the list in batches through the "export selected" control
    Export(commands::export::ExportArgs),

    /// Save the thumbnail of every item, one file per item
    Thumbnails(commands::thumbnails::ThumbnailsArgs),

    /// Trigger a few synthetic saves to surface the download permission prompt
    Bootstrap(commands::bootstrap::BootstrapArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show stored checkpoints
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolveStrategy;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["gallery-export", "export"]);
        assert_eq!(cli.config, "gallery-export.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["gallery-export", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["gallery-export", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_export_overrides() {
        let cli = Cli::parse_from([
            "gallery-export",
            "export",
            "--yes",
            "--start-index",
            "#00120",
            "--batch-size",
            "20",
            "--strategy",
            "positional",
            "--max-batches",
            "3",
            "--no-resume",
        ]);

        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert!(args.yes);
        assert_eq!(args.start_index.map(|i| i.value()), Some(120));
        assert_eq!(args.batch_size, Some(20));
        assert_eq!(args.strategy, Some(ResolveStrategy::Positional));
        assert_eq!(args.max_batches, Some(3));
        assert!(args.no_resume);
    }

    #[test]
    fn test_cli_rejects_unknown_strategy() {
        let result = Cli::try_parse_from(["gallery-export", "export", "--strategy", "random"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_thumbnails() {
        let cli = Cli::parse_from(["gallery-export", "thumbnails", "--skip-bootstrap"]);
        let Commands::Thumbnails(args) = cli.command else {
            panic!("expected thumbnails command");
        };
        assert!(args.skip_bootstrap);
        assert!(args.start_index.is_none());
    }

    #[test]
    fn test_cli_parse_bootstrap() {
        let cli = Cli::parse_from(["gallery-export", "bootstrap", "--count", "3"]);
        let Commands::Bootstrap(args) = cli.command else {
            panic!("expected bootstrap command");
        };
        assert_eq!(args.count, Some(3));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["gallery-export", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["gallery-export", "status", "--kind", "thumbnails"]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["gallery-export", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
