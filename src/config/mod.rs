//! Configuration management for the exporter.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `GALLERY_EXPORT_<SECTION>_<KEY>` overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gallery_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("gallery-export.toml")?;
//!
//! println!("WebDriver: {}", config.webdriver.url);
//! println!("Batch size: {}", config.export.batch_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level, prompts
//! - [`SurfaceConfig`] - Which automation surface to drive
//! - [`WebDriverConfig`] - WebDriver endpoint and browser profile
//! - [`SimulatedConfig`] - Shape of the simulated gallery
//! - [`ListConfig`] - URLs, queries and identifier conventions of the list
//! - [`TraversalConfig`] - Index resolution and window eviction
//! - [`ExportConfig`] - Batch size, retries, confirmation timeouts
//! - [`ThumbnailConfig`] - Per-item thumbnail export
//! - [`RecoveryConfig`] - Reload-and-resume after fatal errors
//! - [`StateConfig`] - Checkpoint persistence
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [webdriver]
//! url = "http://localhost:9515"
//! user_data_dir = "cache"
//!
//! [traversal]
//! strategy = "contiguous"
//! window_cap = 105
//!
//! [export]
//! batch_size = 40
//! max_attempts = 3
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ExportConfig, ExporterConfig, ListConfig, LoggingConfig, RecoveryConfig,
    ResolveStrategy, SimulatedConfig, StateConfig, SurfaceConfig, SurfaceTarget, ThumbnailConfig,
    TraversalConfig, WebDriverConfig,
};
