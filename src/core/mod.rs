//! Core logic of the exporter.
//!
//! # Modules
//!
//! - [`window`] - Materialized window snapshots and eviction
//! - [`cursor`] - Stable global indices over the virtualized list
//! - [`export`] - Batch export, coordination, recovery and thumbnails
//! - [`state`] - Checkpoints for resuming interrupted runs
//! - [`wait`] - Bounded polling waits
//!
//! # Export Workflow
//!
//! 1. **Load State**: Read the checkpoint and pick the resume index
//! 2. **Select**: Resolve each index of the batch and select it
//! 3. **Export**: Click the export control and classify the status message
//! 4. **Checkpoint**: Record the last confirmed index
//! 5. **Evict**: Bound the window on a fixed cadence
//! 6. **Recover**: Reload the list after fatal errors and resume
//! 7. **Report**: Generate the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use gallery_export::adapters::surface::create_surface;
//! use gallery_export::config::load_config;
//! use gallery_export::core::export::ExportCoordinator;
//! use gallery_export::core::state::StateManager;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("gallery-export.toml")?;
//! let surface = create_surface(&config).await?;
//! let state = Arc::new(StateManager::from_config(&config.state));
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ExportCoordinator::new(config, surface, state, shutdown_rx)?;
//!
//! let summary = coordinator.execute_export(None).await?;
//! println!("Confirmed: {}", summary.items_confirmed);
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod export;
pub mod state;
pub mod wait;
pub mod window;
