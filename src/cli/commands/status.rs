//! Status command implementation
//!
//! This module implements the `status` command for displaying stored
//! checkpoints.

use crate::config::load_config;
use crate::core::state::{Checkpoint, ExportStatus, StateManager};
use crate::domain::{GlobalIndex, RunKind};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show this run kind (batch or thumbnails)
    #[arg(long)]
    pub kind: Option<RunKind>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        println!("📊 Export Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if !config.state.enable_checkpointing {
            println!("Checkpointing is disabled; no progress is stored.");
            return Ok(0);
        }

        let state_manager = StateManager::from_config(&config.state);
        let checkpoints = match state_manager.get_all_checkpoints().await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load checkpoints");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        let filtered: Vec<&Checkpoint> = checkpoints
            .iter()
            .filter(|c| self.kind.map_or(true, |kind| c.id == kind))
            .collect();

        if filtered.is_empty() {
            println!("No export history found.");
            println!("Run 'gallery-export export' to start exporting.");
            return Ok(0);
        }

        println!("Found {} checkpoint(s):", filtered.len());
        println!();
        println!(
            "{:<12} {:<16} {:<12} {:<10} {:<10} {:<20}",
            "Kind", "Status", "Resume At", "Items", "Recoveries", "Last Run"
        );
        println!("{}", "-".repeat(86));

        for checkpoint in filtered {
            println!("{}", format_row(checkpoint));
        }

        println!();
        Ok(0)
    }
}

fn status_label(status: ExportStatus) -> &'static str {
    match status {
        ExportStatus::Completed => "✅ Completed",
        ExportStatus::InProgress => "🔄 In Progress",
        ExportStatus::Failed => "❌ Failed",
        ExportStatus::Interrupted => "⏸️  Interrupted",
        ExportStatus::NotStarted => "⏸️  Not Started",
    }
}

fn format_row(checkpoint: &Checkpoint) -> String {
    let last_run = checkpoint
        .last_run_completed_at
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Never".to_string());

    format!(
        "{:<12} {:<16} {:<12} {:<10} {:<10} {:<20}",
        checkpoint.id.as_str(),
        status_label(checkpoint.status),
        checkpoint.resume_index(GlobalIndex::ZERO).to_string(),
        checkpoint.items_exported,
        checkpoint.recoveries,
        last_run
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::CheckpointBuilder;

    #[test]
    fn test_status_args_with_filter() {
        let args = StatusArgs {
            kind: Some(RunKind::Thumbnails),
        };
        assert_eq!(args.kind, Some(RunKind::Thumbnails));
    }

    #[test]
    fn test_format_row_shows_resume_index() {
        let checkpoint = CheckpointBuilder::new(RunKind::Batch, "https://example.com/#/gallery")
            .last_confirmed_index(GlobalIndex::new(79))
            .items_exported(80)
            .status(ExportStatus::Interrupted)
            .build();

        let row = format_row(&checkpoint);
        assert!(row.starts_with("batch"));
        assert!(row.contains("#00080"));
        assert!(row.contains("Interrupted"));
        assert!(row.contains("Never"));
    }
}
