//! Configuration schema types
//!
//! This module defines the configuration structure for the exporter.

use crate::domain::{ItemNaming, OutcomeMarkers, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Automation surface selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceTarget {
    /// A browser driven through a W3C WebDriver endpoint
    #[default]
    WebDriver,
    /// The built-in simulated gallery (dry runs)
    Simulated,
}

/// Index resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolveStrategy {
    /// Assumes materialized items are contiguous and persistent; tracks the
    /// local position as `index - eviction_offset` against the window length
    #[default]
    Contiguous,
    /// Computes each item's index from its section/offset identifier; robust to
    /// non-contiguous numbering across virtualization boundaries
    Positional,
}

/// Main exporter configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Which automation surface to drive
    #[serde(default)]
    pub surface: SurfaceConfig,

    /// WebDriver endpoint settings (used when surface.target = "webdriver")
    #[serde(default)]
    pub webdriver: WebDriverConfig,

    /// Simulated gallery settings (used when surface.target = "simulated")
    #[serde(default)]
    pub simulated: SimulatedConfig,

    /// List surface locations and naming conventions
    #[serde(default)]
    pub list: ListConfig,

    /// Index resolution and window eviction
    #[serde(default)]
    pub traversal: TraversalConfig,

    /// Batch export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Per-item thumbnail export settings
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    /// Recovery after fatal errors
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Checkpoint persistence
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ExporterConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.application.validate()?;
        match self.surface.target {
            SurfaceTarget::WebDriver => self.webdriver.validate()?,
            SurfaceTarget::Simulated => self.simulated.validate()?,
        }
        self.list.validate()?;
        self.traversal.validate()?;
        self.export.validate()?;
        self.thumbnails.validate()?;
        self.recovery.validate()?;
        self.state.validate()?;
        self.logging.validate()?;

        if self.traversal.window_cap < self.export.batch_size {
            return Err(format!(
                "traversal.window_cap ({}) must be >= export.batch_size ({})",
                self.traversal.window_cap, self.export.batch_size
            ));
        }

        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Skip interactive prompts (sign-in, download permission)
    #[serde(default)]
    pub non_interactive: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            non_interactive: false,
        }
    }
}

/// Surface selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Surface target (webdriver or simulated)
    #[serde(default)]
    pub target: SurfaceTarget,
}

/// WebDriver endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    /// WebDriver server URL (chromedriver, geckodriver, selenium)
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// Attach to an existing session instead of creating one
    #[serde(default)]
    pub session_id: Option<String>,

    /// Browser name requested in the new-session capabilities
    #[serde(default = "default_browser")]
    pub browser: String,

    /// Persistent browser profile directory, keeps the sign-in across runs
    #[serde(default)]
    pub user_data_dir: Option<String>,

    /// Extra browser arguments
    #[serde(default)]
    pub browser_args: Vec<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Delete the session when the run ends (only for sessions we created)
    #[serde(default = "default_true")]
    pub close_on_exit: bool,
}

impl WebDriverConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        validate_http_url("webdriver.url", &self.url)?;

        if self.browser.is_empty() {
            return Err("webdriver.browser cannot be empty".to_string());
        }

        if self.request_timeout_seconds == 0 {
            return Err("webdriver.request_timeout_seconds must be > 0".to_string());
        }

        if let Some(session_id) = &self.session_id {
            if session_id.trim().is_empty() {
                return Err("webdriver.session_id cannot be blank when set".to_string());
            }
        }

        Ok(())
    }

    /// HTTP request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            session_id: None,
            browser: default_browser(),
            user_data_dir: Some(default_user_data_dir()),
            browser_args: Vec::new(),
            request_timeout_seconds: default_request_timeout_seconds(),
            close_on_exit: true,
        }
    }
}

/// Simulated gallery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedConfig {
    /// Number of items in each section, in presentation order
    #[serde(default = "default_simulated_sections")]
    pub sections: Vec<u32>,

    /// Items materialized on load and per scroll
    #[serde(default = "default_simulated_page_size")]
    pub page_size: usize,
}

impl SimulatedConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.page_size == 0 {
            return Err("simulated.page_size must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            sections: default_simulated_sections(),
            page_size: default_simulated_page_size(),
        }
    }
}

/// List surface locations and naming conventions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Page opened before the interactive sign-in
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Root view of the list, reloaded during recovery
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Structural query matching every materialized list item
    #[serde(default = "default_item_query")]
    pub item_query: String,

    /// Identifier prefix of list items (`<prefix><section>_<offset>`)
    #[serde(default = "default_item_id_prefix")]
    pub item_id_prefix: String,

    /// Identifier prefix of the per-item select control
    #[serde(default = "default_select_control_prefix")]
    pub select_control_prefix: String,

    /// Identifier of the "export selected" control
    #[serde(default = "default_export_control_id")]
    pub export_control_id: String,

    /// Identifier of the transient status message element
    #[serde(default = "default_status_message_id")]
    pub status_message_id: String,

    /// Query, relative to an item, matching its loaded thumbnail image
    #[serde(default = "default_thumbnail_query")]
    pub thumbnail_query: String,
}

impl ListConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        validate_http_url("list.start_url", &self.start_url)?;
        validate_http_url("list.root_url", &self.root_url)?;

        let required = [
            ("list.item_query", &self.item_query),
            ("list.item_id_prefix", &self.item_id_prefix),
            ("list.select_control_prefix", &self.select_control_prefix),
            ("list.export_control_id", &self.export_control_id),
            ("list.status_message_id", &self.status_message_id),
            ("list.thumbnail_query", &self.thumbnail_query),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{name} cannot be empty"));
            }
        }

        if self.item_id_prefix == self.select_control_prefix {
            return Err(
                "list.select_control_prefix must differ from list.item_id_prefix".to_string(),
            );
        }

        Ok(())
    }

    /// Builds the item naming convention
    pub fn naming(&self) -> Result<ItemNaming> {
        ItemNaming::new(&self.item_id_prefix, &self.select_control_prefix)
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            start_url: default_start_url(),
            root_url: default_root_url(),
            item_query: default_item_query(),
            item_id_prefix: default_item_id_prefix(),
            select_control_prefix: default_select_control_prefix(),
            export_control_id: default_export_control_id(),
            status_message_id: default_status_message_id(),
            thumbnail_query: default_thumbnail_query(),
        }
    }
}

/// Index resolution and window eviction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Resolution strategy (contiguous or positional)
    #[serde(default)]
    pub strategy: ResolveStrategy,

    /// Number of most recent items kept materialized after eviction
    #[serde(default = "default_window_cap")]
    pub window_cap: usize,

    /// Evict after every N batches
    #[serde(default = "default_eviction_every_batches")]
    pub eviction_every_batches: usize,

    /// Pause after removing items so the surface can settle
    #[serde(default = "default_eviction_settle_ms")]
    pub eviction_settle_ms: u64,

    /// Consecutive polls without new content before the list counts as exhausted
    #[serde(default = "default_stall_threshold")]
    pub stall_threshold: u32,

    /// Delay between resolution polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Consecutive surface errors tolerated while polling
    #[serde(default = "default_max_transient_errors")]
    pub max_transient_errors: u32,
}

impl TraversalConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.window_cap == 0 {
            return Err("traversal.window_cap must be > 0".to_string());
        }
        if self.eviction_every_batches == 0 {
            return Err("traversal.eviction_every_batches must be > 0".to_string());
        }
        if self.stall_threshold == 0 {
            return Err("traversal.stall_threshold must be > 0".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("traversal.poll_interval_ms must be > 0".to_string());
        }
        Ok(())
    }

    /// Delay between resolution polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Pause after an eviction that removed items
    pub fn eviction_settle(&self) -> Duration {
        Duration::from_millis(self.eviction_settle_ms)
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            strategy: ResolveStrategy::default(),
            window_cap: default_window_cap(),
            eviction_every_batches: default_eviction_every_batches(),
            eviction_settle_ms: default_eviction_settle_ms(),
            stall_threshold: default_stall_threshold(),
            poll_interval_ms: default_poll_interval_ms(),
            max_transient_errors: default_max_transient_errors(),
        }
    }
}

/// Batch export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Global index to begin at when no checkpoint exists
    #[serde(default)]
    pub start_index: u64,

    /// Items selected per export command
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Stop after this many batches (unbounded when unset)
    #[serde(default)]
    pub max_batches: Option<usize>,

    /// Resume from the stored checkpoint when one exists
    #[serde(default = "default_true")]
    pub resume: bool,

    /// Export attempts per batch before the batch is fatal
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff base; attempt N waits base × N seconds
    #[serde(default = "default_retry_backoff_base_secs")]
    pub retry_backoff_base_secs: u64,

    /// Maximum wait for the confirmation message to appear
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    /// Wait for the confirmation message to disappear before continuing
    #[serde(default = "default_true")]
    pub wait_for_fade: bool,

    /// Maximum wait for the confirmation message to disappear
    #[serde(default = "default_fade_timeout_secs")]
    pub fade_timeout_secs: u64,

    /// Maximum wait for a control to become clickable
    #[serde(default = "default_control_timeout_secs")]
    pub control_timeout_secs: u64,

    /// Delay between probes while waiting on the surface
    #[serde(default = "default_wait_poll_ms")]
    pub wait_poll_ms: u64,

    /// Text present in a success confirmation
    #[serde(default = "default_success_marker")]
    pub success_marker: String,

    /// Text present in a failure confirmation
    #[serde(default = "default_failure_marker")]
    pub failure_marker: String,
}

impl ExportConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.batch_size == 0 {
            return Err("export.batch_size must be > 0".to_string());
        }
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(format!(
                "export.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            ));
        }
        if self.max_batches == Some(0) {
            return Err("export.max_batches must be > 0 when set".to_string());
        }
        if self.confirmation_timeout_secs == 0 {
            return Err("export.confirmation_timeout_secs must be > 0".to_string());
        }
        if self.control_timeout_secs == 0 {
            return Err("export.control_timeout_secs must be > 0".to_string());
        }
        if self.wait_poll_ms == 0 {
            return Err("export.wait_poll_ms must be > 0".to_string());
        }
        if self.success_marker.is_empty() {
            return Err("export.success_marker cannot be empty".to_string());
        }
        if self.success_marker == self.failure_marker {
            return Err("export.success_marker and export.failure_marker must differ".to_string());
        }
        Ok(())
    }

    /// Backoff before retry number `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.retry_backoff_base_secs * u64::from(attempt))
    }

    /// Markers classifying the confirmation message
    pub fn markers(&self) -> OutcomeMarkers {
        OutcomeMarkers::new(&self.success_marker, &self.failure_marker)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn fade_timeout(&self) -> Duration {
        Duration::from_secs(self.fade_timeout_secs)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_secs(self.control_timeout_secs)
    }

    pub fn wait_poll(&self) -> Duration {
        Duration::from_millis(self.wait_poll_ms)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            start_index: 0,
            batch_size: default_batch_size(),
            max_batches: None,
            resume: true,
            max_attempts: default_max_attempts(),
            retry_backoff_base_secs: default_retry_backoff_base_secs(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            wait_for_fade: true,
            fade_timeout_secs: default_fade_timeout_secs(),
            control_timeout_secs: default_control_timeout_secs(),
            wait_poll_ms: default_wait_poll_ms(),
            success_marker: default_success_marker(),
            failure_marker: default_failure_marker(),
        }
    }
}

/// Thumbnail export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Evict the window after every N saved thumbnails
    #[serde(default = "default_evict_every_items")]
    pub evict_every_items: u64,

    /// Maximum wait for an item's image source to load
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Consecutive failures on one item before recovery
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Pause before retrying a failed item
    #[serde(default = "default_thumbnail_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Number of synthetic saves issued by the download permission bootstrap
    #[serde(default = "default_bootstrap_count")]
    pub bootstrap_count: usize,
}

impl ThumbnailConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.evict_every_items == 0 {
            return Err("thumbnails.evict_every_items must be > 0".to_string());
        }
        if self.failure_threshold == 0 {
            return Err("thumbnails.failure_threshold must be > 0".to_string());
        }
        if self.image_timeout_secs == 0 {
            return Err("thumbnails.image_timeout_secs must be > 0".to_string());
        }
        Ok(())
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            evict_every_items: default_evict_every_items(),
            image_timeout_secs: default_image_timeout_secs(),
            failure_threshold: default_failure_threshold(),
            retry_delay_secs: default_thumbnail_retry_delay_secs(),
            bootstrap_count: default_bootstrap_count(),
        }
    }
}

/// Recovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Reload the list and resume after fatal errors; when disabled the
    /// first fatal error stops the run
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Pause before reloading
    #[serde(default = "default_recovery_delay_secs")]
    pub delay_secs: u64,

    /// Give up after this many recoveries without a confirmed batch in between
    #[serde(default)]
    pub max_consecutive: Option<u32>,
}

impl RecoveryConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.max_consecutive == Some(0) {
            return Err("recovery.max_consecutive must be > 0 when set".to_string());
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_secs: default_recovery_delay_secs(),
            max_consecutive: None,
        }
    }
}

/// State management configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Persist checkpoints to disk
    #[serde(default = "default_true")]
    pub enable_checkpointing: bool,

    /// Checkpoint file path
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: String,
}

impl StateConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.enable_checkpointing && self.checkpoint_path.trim().is_empty() {
            return Err(
                "state.checkpoint_path cannot be empty when checkpointing is enabled".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            enable_checkpointing: true,
            checkpoint_path: default_checkpoint_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_http_url(name: &str, value: &str) -> std::result::Result<(), String> {
    let parsed = Url::parse(value).map_err(|e| format!("{name} is not a valid URL: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("{name} must start with http:// or https://"));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_browser() -> String {
    "chrome".to_string()
}

fn default_user_data_dir() -> String {
    "cache".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    60
}

fn default_simulated_sections() -> Vec<u32> {
    vec![120, 80, 64, 200]
}

fn default_simulated_page_size() -> usize {
    60
}

fn default_start_url() -> String {
    "https://support.samsungcloud.com/".to_string()
}

fn default_root_url() -> String {
    "https://support.samsungcloud.com/#/gallery".to_string()
}

fn default_item_query() -> String {
    "//div[@role='listitem']".to_string()
}

fn default_item_id_prefix() -> String {
    "gallerySelector".to_string()
}

fn default_select_control_prefix() -> String {
    "gallerySelectorCircle".to_string()
}

fn default_export_control_id() -> String {
    "gallerySelectedItemBtnDownload".to_string()
}

fn default_status_message_id() -> String {
    "toast-root".to_string()
}

fn default_thumbnail_query() -> String {
    ".//img[@role='presentation'][not(@src='')]".to_string()
}

fn default_window_cap() -> usize {
    105
}

fn default_eviction_every_batches() -> usize {
    1
}

fn default_eviction_settle_ms() -> u64 {
    2000
}

fn default_stall_threshold() -> u32 {
    30
}

fn default_poll_interval_ms() -> u64 {
    400
}

fn default_max_transient_errors() -> u32 {
    5
}

fn default_batch_size() -> usize {
    40
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_base_secs() -> u64 {
    10
}

fn default_confirmation_timeout_secs() -> u64 {
    600
}

fn default_fade_timeout_secs() -> u64 {
    40
}

fn default_control_timeout_secs() -> u64 {
    20
}

fn default_wait_poll_ms() -> u64 {
    500
}

fn default_success_marker() -> String {
    "downloaded".to_string()
}

fn default_failure_marker() -> String {
    "not be downloaded".to_string()
}

fn default_evict_every_items() -> u64 {
    50
}

fn default_image_timeout_secs() -> u64 {
    30
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_thumbnail_retry_delay_secs() -> u64 {
    5
}

fn default_bootstrap_count() -> usize {
    5
}

fn default_recovery_delay_secs() -> u64 {
    5
}

fn default_checkpoint_path() -> String {
    "gallery-export-state.json".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExporterConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_webdriver_url_validation() {
        let mut config = WebDriverConfig::default();
        assert!(config.validate().is_ok());

        config.url = "localhost:9515".to_string();
        assert!(config.validate().is_err());

        config.url = "ftp://localhost:9515".to_string();
        assert!(config.validate().is_err());

        config.url = "http://localhost:4444/wd/hub".to_string();
        config.session_id = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_list_config_validation() {
        let mut config = ListConfig::default();
        assert!(config.validate().is_ok());

        config.select_control_prefix = config.item_id_prefix.clone();
        let err = config.validate().unwrap_err();
        assert!(err.contains("must differ"));

        config.select_control_prefix = "circle".to_string();
        config.export_control_id = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_traversal_config_validation() {
        let mut config = TraversalConfig::default();
        assert!(config.validate().is_ok());

        config.stall_threshold = 0;
        assert!(config.validate().is_err());

        config.stall_threshold = 30;
        config.window_cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_config_validation() {
        let mut config = ExportConfig::default();
        assert!(config.validate().is_ok());

        config.max_attempts = 0;
        assert!(config.validate().is_err());

        config.max_attempts = 11;
        assert!(config.validate().is_err());

        config.max_attempts = 3;
        config.failure_marker = config.success_marker.clone();
        assert!(config.validate().is_err());

        config.failure_marker = "not be downloaded".to_string();
        config.max_batches = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_cap_must_hold_a_batch() {
        let mut config = ExporterConfig::default();
        config.export.batch_size = 200;
        let err = config.validate().unwrap_err();
        assert!(err.contains("window_cap"));
    }

    #[test]
    fn test_simulated_target_skips_webdriver_validation() {
        let mut config = ExporterConfig::default();
        config.surface.target = SurfaceTarget::Simulated;
        config.webdriver.url = "not a url".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backoff_is_linear() {
        let config = ExportConfig::default();
        assert_eq!(config.backoff_for(1), Duration::from_secs(10));
        assert_eq!(config.backoff_for(2), Duration::from_secs(20));
        assert_eq!(config.backoff_for(3), Duration::from_secs(30));
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_batch_size(), 40);
        assert_eq!(default_window_cap(), 105);
        assert_eq!(default_stall_threshold(), 30);
        assert_eq!(default_poll_interval_ms(), 400);
        assert_eq!(default_max_attempts(), 3);
        assert_eq!(default_confirmation_timeout_secs(), 600);
        assert_eq!(default_fade_timeout_secs(), 40);
        assert_eq!(ResolveStrategy::default(), ResolveStrategy::Contiguous);
        assert_eq!(SurfaceTarget::default(), SurfaceTarget::WebDriver);
    }

    #[test]
    fn test_strategy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            strategy: ResolveStrategy,
        }
        let parsed: Wrapper = toml::from_str("strategy = \"positional\"").unwrap();
        assert_eq!(parsed.strategy, ResolveStrategy::Positional);
    }
}
