//! Bootstrap command implementation
//!
//! Triggers a few synthetic file saves so the browser's "download multiple
//! files" permission can be granted before an unattended run. The browser
//! stays open until the user confirms the permission was handled.

use super::{
    close_surface, grant_download_permission, load_validated, open_list,
    wait_for_download_permission,
};
use crate::adapters::surface::create_surface;
use clap::Args;

/// Arguments for the bootstrap command
#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Number of saves (defaults to thumbnails.bootstrap_count)
    #[arg(long)]
    pub count: Option<usize>,

    /// Skip the sign-in prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl BootstrapArgs {
    /// Execute the bootstrap command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load_validated(config_path, |_| {}) else {
            return Ok(2);
        };
        let count = self.count.unwrap_or(config.thumbnails.bootstrap_count);
        tracing::info!(count = count, "Starting download permission bootstrap");

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

        let interactive = !config.application.non_interactive;
        let result = grant_download_permission(surface.clone(), count, || {
            if interactive {
                wait_for_download_permission()
            } else {
                Ok(())
            }
        })
        .await;
        close_surface(surface.as_ref()).await;

        match result {
            Ok(saved) => {
                println!("✅ Issued {saved} bootstrap save(s)");
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Bootstrap failed");
                eprintln!("Bootstrap failed: {e}");
                Ok(5)
            }
        }
    }
}
