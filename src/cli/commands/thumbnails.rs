//! Thumbnails command implementation
//!
//! Saves every item's thumbnail as its own file, named after the item's
//! zero-padded global index.

use super::export::{exit_code, print_summary};
use super::{
    apply_dry_run, close_surface, confirm, grant_download_permission, load_validated, open_list,
    wait_for_download_permission,
};
use crate::adapters::surface::create_surface;
use crate::core::export::ThumbnailExporter;
use crate::core::state::StateManager;
use crate::domain::GlobalIndex;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the thumbnails command
#[derive(Args, Debug)]
pub struct ThumbnailsArgs {
    /// Skip confirmation and sign-in prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Run against the simulated gallery without persisting checkpoints
    #[arg(long)]
    pub dry_run: bool,

    /// Global index to start at (overrides the checkpoint)
    #[arg(long, value_name = "INDEX")]
    pub start_index: Option<GlobalIndex>,

    /// Ignore the stored checkpoint
    #[arg(long)]
    pub no_resume: bool,

    /// Do not issue the download permission bootstrap saves
    #[arg(long)]
    pub skip_bootstrap: bool,
}

impl ThumbnailsArgs {
    /// Execute the thumbnails command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting thumbnails command");

        let Some(config) = load_validated(config_path, |config| {
            if self.no_resume {
                config.export.resume = false;
            }
            if self.dry_run {
                apply_dry_run(config);
            }
        }) else {
            return Ok(2);
        };

        let interactive = !self.yes && !config.application.non_interactive;

        if interactive {
            println!("Thumbnail Configuration:");
            println!("  List: {}", config.list.root_url);
            println!("  Evict every: {} items", config.thumbnails.evict_every_items);
            println!("  Failure threshold: {}", config.thumbnails.failure_threshold);
            println!();

            if !confirm("Proceed with thumbnail export?")? {
                println!("Thumbnail export cancelled.");
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

        if !self.skip_bootstrap && config.thumbnails.bootstrap_count > 0 {
            let granted = grant_download_permission(
                surface.clone(),
                config.thumbnails.bootstrap_count,
                || {
                    if interactive {
                        wait_for_download_permission()
                    } else {
                        Ok(())
                    }
                },
            )
            .await;
            if let Err(e) = granted {
                tracing::error!(error = %e, "Download permission bootstrap failed");
                eprintln!("Download permission bootstrap failed: {e}");
                close_surface(surface.as_ref()).await;
                return Ok(4);
            }
        }

        let state_manager = Arc::new(StateManager::from_config(&config.state));
        let exporter =
            match ThumbnailExporter::new(config, surface.clone(), state_manager, shutdown_signal) {
                Ok(e) => e,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create thumbnail exporter");
                    eprintln!("Failed to initialize thumbnail export: {e}");
                    close_surface(surface.as_ref()).await;
                    return Ok(2);
                }
            };

        println!("🚀 Starting thumbnail export...");
        println!();

        let result = exporter.execute(self.start_index).await;
        close_surface(surface.as_ref()).await;

        let summary = match result {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Thumbnail export failed");
                eprintln!("Thumbnail export failed: {e}");
                return Ok(5);
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary))
    }
}
