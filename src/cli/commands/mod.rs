//! CLI command implementations
//!
//! This module contains all CLI command implementations and the steps they
//! share: loading the configuration, prompting, opening the list and asking
//! for the download permission.

pub mod bootstrap;
pub mod export;
pub mod init;
pub mod status;
pub mod thumbnails;
pub mod validate;

use crate::adapters::surface::AutomationSurface;
use crate::config::{load_config, ExporterConfig, ResolveStrategy, SurfaceTarget};
use crate::core::export::DownloadBootstrap;
use std::io::{self, Write};
use std::sync::Arc;

/// Load and validate the configuration, printing the failure
///
/// Returns `None` when the file cannot be loaded or is invalid; callers exit
/// with code 2.
pub(crate) fn load_validated(
    config_path: &str,
    apply: impl FnOnce(&mut ExporterConfig),
) -> Option<ExporterConfig> {
    let mut config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("Failed to load configuration: {e}");
            return None;
        }
    };

    apply(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration validation failed");
        eprintln!("Configuration validation failed: {e}");
        return None;
    }

    Some(config)
}

/// Point the run at the simulated gallery and keep checkpoints in memory
pub(crate) fn apply_dry_run(config: &mut ExporterConfig) {
    tracing::info!("Dry run: using the simulated gallery, checkpoints are not persisted");
    config.surface.target = SurfaceTarget::Simulated;
    config.state.enable_checkpointing = false;
    config.application.non_interactive = true;
}

/// Parse a resolution strategy name
pub(crate) fn parse_strategy(value: &str) -> Result<ResolveStrategy, String> {
    match value.to_ascii_lowercase().as_str() {
        "contiguous" => Ok(ResolveStrategy::Contiguous),
        "positional" => Ok(ResolveStrategy::Positional),
        other => Err(format!(
            "Invalid strategy '{other}'. Must be one of: contiguous, positional"
        )),
    }
}

/// Ask a yes/no question on stdin; anything but `y` means no
pub(crate) fn confirm(question: &str) -> io::Result<bool> {
    print!("{question} [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Block until the user presses Enter
pub(crate) fn wait_for_enter(message: &str) -> io::Result<()> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(())
}

/// Open the start page, let the user sign in, then open the list root
///
/// The prompt is skipped when `skip_prompt` is set or the configuration is
/// non-interactive.
pub(crate) async fn open_list(
    surface: &dyn AutomationSurface,
    config: &ExporterConfig,
    skip_prompt: bool,
) -> anyhow::Result<()> {
    tracing::info!(url = %config.list.start_url, "Opening start page");
    surface.navigate(&config.list.start_url).await?;

    if !skip_prompt && !config.application.non_interactive {
        println!("🔑 Sign in to the gallery in the browser window.");
        wait_for_enter("   Press Enter once the list is reachable... ")?;
    }

    tracing::info!(url = %config.list.root_url, "Opening list root");
    surface.navigate(&config.list.root_url).await?;
    Ok(())
}

/// Issue the bootstrap saves, then `pause` so the browser's permission
/// prompt can be answered while the surface is still open
///
/// `pause` is not called when a save fails.
pub(crate) async fn grant_download_permission(
    surface: Arc<dyn AutomationSurface>,
    count: usize,
    pause: impl FnOnce() -> io::Result<()>,
) -> anyhow::Result<usize> {
    let saved = DownloadBootstrap::new(surface).run(count).await?;
    println!("📥 Allow the browser to download multiple files if it asks.");
    pause()?;
    Ok(saved)
}

/// Prompt shown while waiting on the download permission
pub(crate) fn wait_for_download_permission() -> io::Result<()> {
    wait_for_enter("   Press Enter to continue... ")
}

/// Close the surface at the end of a command, logging failures
pub(crate) async fn close_surface(surface: &dyn AutomationSurface) {
    if let Err(e) = surface.close().await {
        tracing::warn!(error = %e, surface = %surface.describe(), "Failed to close surface");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{FailurePoint, SimulatedGallery};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use test_case::test_case;

    #[test_case("contiguous", ResolveStrategy::Contiguous ; "contiguous")]
    #[test_case("Positional", ResolveStrategy::Positional ; "case insensitive")]
    fn test_parse_strategy(value: &str, expected: ResolveStrategy) {
        assert_eq!(parse_strategy(value).unwrap(), expected);
    }

    #[test]
    fn test_parse_strategy_rejects_unknown() {
        let err = parse_strategy("sorted").unwrap_err();
        assert!(err.contains("contiguous, positional"));
    }

    #[test]
    fn test_apply_dry_run() {
        let mut config = ExporterConfig::default();
        apply_dry_run(&mut config);

        assert_eq!(config.surface.target, SurfaceTarget::Simulated);
        assert!(!config.state.enable_checkpointing);
        assert!(config.application.non_interactive);
    }

    #[tokio::test]
    async fn test_download_permission_pauses_after_saves() {
        let gallery = Arc::new(SimulatedGallery::new(vec![1], 1).unwrap());
        let pauses = AtomicUsize::new(0);

        let saved = grant_download_permission(gallery.clone(), 3, || {
            pauses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(saved, 3);
        assert_eq!(pauses.load(Ordering::SeqCst), 1);
        assert_eq!(gallery.saved_files().await.len(), 3);
    }

    #[tokio::test]
    async fn test_download_permission_skips_pause_on_failed_save() {
        let gallery = Arc::new(SimulatedGallery::new(vec![1], 1).unwrap());
        gallery.inject_failure(FailurePoint::SaveFile, 1).await;
        let pauses = AtomicUsize::new(0);

        let result = grant_download_permission(gallery.clone(), 3, || {
            pauses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(pauses.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_open_list_visits_start_then_root() {
        let gallery = SimulatedGallery::new(vec![10], 10).unwrap();
        let config = ExporterConfig::default();

        open_list(&gallery, &config, true).await.unwrap();

        assert_eq!(
            gallery.navigations().await,
            vec![config.list.start_url.clone(), config.list.root_url.clone()]
        );
    }
}
