// Gallery Export - Virtualized list bulk exporter
// Copyright (c) 2025 Gallery Export Contributors
// Licensed under the MIT License

//! # Gallery Export
//!
//! Bulk exporter for a web gallery whose list view is virtualized: only a
//! window of items is materialized at any time, more items load as the view
//! scrolls, and the page grows until it becomes unusable unless old items are
//! removed.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Resolving** a stable global index to a live list item, scrolling to
//!   trigger lazy loading and detecting the end of the list
//! - **Bounding** the materialized window by removing already-processed items
//! - **Exporting** consecutive batches through the list's "export selected"
//!   control, with confirmation parsing and bounded retries
//! - **Saving** per-item thumbnails named after their global index
//! - **Recovering** from fatal errors by reloading the list and resuming after
//!   the last confirmed index, with checkpoints persisted across restarts
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Traversal, window eviction, export and state
//! - [`adapters`] - Automation surfaces (WebDriver and a simulated gallery)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gallery_export::adapters::surface::create_surface;
//! use gallery_export::config::load_config;
//! use gallery_export::core::export::ExportCoordinator;
//! use gallery_export::core::state::StateManager;
//! use std::sync::Arc;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("gallery-export.toml")?;
//!     let surface = create_surface(&config).await?;
//!     surface.navigate(&config.list.root_url).await?;
//!
//!     let state = Arc::new(StateManager::from_config(&config.state));
//!     let (_tx, shutdown) = watch::channel(false);
//!     let coordinator = ExportCoordinator::new(config, surface, state, shutdown)?;
//!
//!     let summary = coordinator.execute_export(None).await?;
//!     println!("Exported {} items", summary.items_confirmed);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All library errors are [`domain::ExporterError`]. Surface failures are
//! wrapped as [`domain::SurfaceError`] and classified as transient or fatal
//! by the traversal layer.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
