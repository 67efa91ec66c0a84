//! Surface factory
//!
//! Creates the automation surface selected by configuration.

use super::traits::AutomationSurface;
use crate::adapters::memory::SimulatedGallery;
use crate::adapters::webdriver::WebDriverSurface;
use crate::config::{ExporterConfig, SurfaceTarget};
use crate::domain::Result;
use std::sync::Arc;

/// Create the automation surface for the configured target
///
/// For WebDriver this opens (or attaches to) a browser session.
///
/// # Errors
///
/// Returns an error if the WebDriver endpoint cannot be reached or refuses to
/// create a session.
pub async fn create_surface(config: &ExporterConfig) -> Result<Arc<dyn AutomationSurface>> {
    match config.surface.target {
        SurfaceTarget::WebDriver => {
            tracing::info!(
                url = %config.webdriver.url,
                browser = %config.webdriver.browser,
                attach = config.webdriver.session_id.is_some(),
                "Connecting to WebDriver"
            );
            let surface = WebDriverSurface::connect(config.webdriver.clone()).await?;
            Ok(Arc::new(surface))
        }
        SurfaceTarget::Simulated => {
            tracing::info!(
                sections = ?config.simulated.sections,
                page_size = config.simulated.page_size,
                "Using simulated gallery"
            );
            let gallery = SimulatedGallery::from_config(&config.simulated, &config.list)?;
            Ok(Arc::new(gallery))
        }
    }
}
