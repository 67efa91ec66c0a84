//! Download permission bootstrap
//!
//! Browsers ask once before a page may save several files in a row. Saving a
//! handful of tiny images up front surfaces that prompt before an unattended
//! run starts.

use crate::adapters::surface::AutomationSurface;
use crate::domain::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;

/// File name of every bootstrap save
pub const BOOTSTRAP_FILE_NAME: &str = "test";

/// A transparent 1x1 PNG
const PIXEL_PNG: [u8; 68] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x04, 0x00, 0x00, 0x00, 0xb5, 0x1c, 0x0c,
    0x02, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0x64, 0x60, 0x00, 0x00,
    0x00, 0x06, 0x00, 0x02, 0x30, 0x81, 0xd0, 0x2f, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44,
    0xae, 0x42, 0x60, 0x82,
];

/// Data URL of the bootstrap image
pub fn pixel_data_url() -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(PIXEL_PNG))
}

/// Issues synthetic file saves
pub struct DownloadBootstrap {
    surface: Arc<dyn AutomationSurface>,
}

impl DownloadBootstrap {
    pub fn new(surface: Arc<dyn AutomationSurface>) -> Self {
        Self { surface }
    }

    /// Trigger `count` saves of the bootstrap image
    ///
    /// # Errors
    ///
    /// Returns the first save that fails. Saves issued before it stay issued.
    pub async fn run(&self, count: usize) -> Result<usize> {
        let url = pixel_data_url();
        for n in 0..count {
            self.surface
                .trigger_file_save(BOOTSTRAP_FILE_NAME, &url)
                .await?;
            tracing::debug!(save = n + 1, count = count, "Bootstrap save issued");
        }
        tracing::info!(count = count, "Download permission bootstrap finished");
        Ok(count)
    }
}
