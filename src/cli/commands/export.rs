//! Export command implementation
//!
//! This module implements the `export` command, which selects consecutive
//! ranges of the list and exports each one through the "export selected"
//! control.

use super::{apply_dry_run, close_surface, confirm, load_validated, open_list, parse_strategy};
use crate::adapters::surface::create_surface;
use crate::config::ResolveStrategy;
use crate::core::export::{ExportCoordinator, ExportSummary};
use crate::core::state::StateManager;
use crate::domain::GlobalIndex;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Skip confirmation and sign-in prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Run against the simulated gallery without persisting checkpoints
    #[arg(long)]
    pub dry_run: bool,

    /// Global index to start at (overrides the checkpoint)
    #[arg(long, value_name = "INDEX")]
    pub start_index: Option<GlobalIndex>,

    /// Override the number of items per export
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Override the index resolution strategy (contiguous or positional)
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<ResolveStrategy>,

    /// Stop after this many batches
    #[arg(long)]
    pub max_batches: Option<usize>,

    /// Ignore the stored checkpoint
    #[arg(long)]
    pub no_resume: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let Some(config) = load_validated(config_path, |config| {
            if let Some(batch_size) = self.batch_size {
                tracing::info!(batch_size = batch_size, "Overriding batch size from CLI");
                config.export.batch_size = batch_size;
            }
            if let Some(strategy) = self.strategy {
                tracing::info!(strategy = ?strategy, "Overriding resolution strategy from CLI");
                config.traversal.strategy = strategy;
            }
            if let Some(max_batches) = self.max_batches {
                config.export.max_batches = Some(max_batches);
            }
            if self.no_resume {
                config.export.resume = false;
            }
            if self.dry_run {
                apply_dry_run(config);
            }
        }) else {
            return Ok(2);
        };

        if self.dry_run {
            println!("🔍 DRY RUN MODE - exporting the simulated gallery");
            println!();
        }

        if !self.yes && !config.application.non_interactive {
            println!("Export Configuration:");
            println!("  List: {}", config.list.root_url);
            println!("  Batch size: {}", config.export.batch_size);
            println!("  Strategy: {:?}", config.traversal.strategy);
            println!(
                "  Start: {}",
                self.start_index
                    .map(|index| index.to_string())
                    .unwrap_or_else(|| "checkpoint".to_string())
            );
            println!(
                "  Max batches: {}",
                config
                    .export
                    .max_batches
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unbounded".to_string())
            );
            println!();

            if !confirm("Proceed with export?")? {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        let surface = match create_surface(&config).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create automation surface");
                eprintln!("Failed to connect to the automation surface: {e}");
                return Ok(4);
            }
        };

        if let Err(e) = open_list(surface.as_ref(), &config, self.yes).await {
            tracing::error!(error = %e, "Failed to open the list");
            eprintln!("Failed to open the list: {e}");
            close_surface(surface.as_ref()).await;
            return Ok(4);
        }

        let state_manager = Arc::new(StateManager::from_config(&config.state));
        let coordinator = match ExportCoordinator::new(
            config,
            surface.clone(),
            state_manager,
            shutdown_signal,
        ) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                close_surface(surface.as_ref()).await;
                return Ok(2);
            }
        };

        println!("🚀 Starting export...");
        println!();

        let result = coordinator.execute_export(self.start_index).await;
        close_surface(surface.as_ref()).await;

        let summary = match result {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(5);
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary))
    }
}

/// Print a run summary shared by the export and thumbnail commands
pub(crate) fn print_summary(summary: &ExportSummary) {
    println!();
    println!("📊 Export Summary:");
    println!(
        "  First index: {}",
        summary
            .first_index
            .map(|index| index.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Last confirmed: {}",
        summary
            .last_confirmed_index
            .map(|index| index.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    if summary.batches_attempted > 0 {
        println!(
            "  Batches: {} confirmed / {} attempted",
            summary.batches_confirmed, summary.batches_attempted
        );
        println!(
            "  Items: {} confirmed / {} selected",
            summary.items_confirmed, summary.items_selected
        );
    }
    if summary.files_saved > 0 {
        println!("  Files saved: {}", summary.files_saved);
    }
    println!("  Retries: {}", summary.retries);
    println!("  Recoveries: {}", summary.recoveries);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}

/// Map a finished run to the process exit code
pub(crate) fn exit_code(summary: &ExportSummary) -> i32 {
    if summary.interrupted {
        println!("⚠️  Run interrupted gracefully. Progress saved.");
        println!("   Run the same command to resume from checkpoint.");
        println!();
        tracing::info!("Run interrupted by user signal");
        130
    } else if summary.is_successful() {
        if summary.end_of_list_reached {
            println!("✅ Reached the end of the list!");
        } else {
            println!("✅ Run completed successfully!");
        }
        0
    } else {
        println!("⚠️  Run completed with errors");
        1
    }
}
