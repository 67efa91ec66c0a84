//! Automation surface integrations.
//!
//! This module provides the adapters the exporter drives the list through:
//!
//! - [`surface`] - The [`surface::AutomationSurface`] trait and the factory
//! - [`webdriver`] - W3C WebDriver over HTTP (chromedriver, geckodriver, msedgedriver)
//! - [`memory`] - Deterministic simulated gallery for dry runs and tests
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate the remote UI and
//! enable testing with the simulated gallery. The core only ever sees
//! `Arc<dyn AutomationSurface>`.
//!
//! # WebDriver Adapter
//!
//! ```rust,no_run
//! use gallery_export::adapters::webdriver::WebDriverSurface;
//! use gallery_export::config::WebDriverConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WebDriverConfig {
//!     url: "http://localhost:9515".to_string(),
//!     ..Default::default()
//! };
//!
//! let surface = WebDriverSurface::connect(config).await?;
//! // Drive the browser through the AutomationSurface trait
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod surface;
pub mod webdriver;
