//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "gallery-export.toml")]
    pub output: String,

    /// Include every setting with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing gallery-export configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Start a WebDriver server (e.g. chromedriver --port=9515)");
                println!("  2. Edit {} with your list URLs", self.output);
                println!("  3. Run: gallery-export validate-config");
                println!("  4. Run: gallery-export export --dry-run");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# gallery-export configuration

[webdriver]
url = "http://localhost:9515"
browser = "chrome"
user_data_dir = "cache"

[list]
start_url = "https://support.samsungcloud.com/"
root_url = "https://support.samsungcloud.com/#/gallery"

[export]
batch_size = 40

[state]
checkpoint_path = "gallery-export-state.json"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# ============================================================================
# gallery-export Configuration File
# ============================================================================
# Values may reference environment variables as ${VAR_NAME}.
# Any key can be overridden with GALLERY_EXPORT_<SECTION>_<KEY>.

[application]
# trace | debug | info | warn | error
log_level = "info"
# Skip the sign-in and download permission prompts
non_interactive = false

# ============================================================================
# Automation Surface
# ============================================================================
[surface]
# webdriver | simulated
target = "webdriver"

[webdriver]
url = "http://localhost:9515"
browser = "chrome"
# Persistent profile; keeps the sign-in between runs
user_data_dir = "cache"
browser_args = []
request_timeout_seconds = 60
# Attach to an existing session instead of starting a browser
# session_id = "${WEBDRIVER_SESSION_ID}"
close_on_exit = true

[simulated]
# Items per section in the simulated gallery (dry runs)
sections = [120, 80, 64, 200]
page_size = 60

# ============================================================================
# List
# ============================================================================
[list]
start_url = "https://support.samsungcloud.com/"
root_url = "https://support.samsungcloud.com/#/gallery"
item_query = "//div[@role='listitem']"
item_id_prefix = "gallerySelector"
select_control_prefix = "gallerySelectorCircle"
export_control_id = "gallerySelectedItemBtnDownload"
status_message_id = "toast-root"
thumbnail_query = ".//img[@role='presentation'][not(@src='')]"

# ============================================================================
# Traversal
# ============================================================================
[traversal]
# contiguous | positional
strategy = "contiguous"
# Items kept materialized after each eviction
window_cap = 105
eviction_every_batches = 1
eviction_settle_ms = 2000
# Polls without new content before the list counts as exhausted
stall_threshold = 30
poll_interval_ms = 400
max_transient_errors = 5

# ============================================================================
# Batch Export
# ============================================================================
[export]
start_index = 0
batch_size = 40
# max_batches = 10
resume = true
max_attempts = 3
# Attempt N waits N x base seconds before retrying
retry_backoff_base_secs = 10
confirmation_timeout_secs = 600
wait_for_fade = true
fade_timeout_secs = 40
control_timeout_secs = 20
wait_poll_ms = 500
success_marker = "downloaded"
failure_marker = "not be downloaded"

# ============================================================================
# Thumbnail Export
# ============================================================================
[thumbnails]
evict_every_items = 50
image_timeout_secs = 30
failure_threshold = 5
retry_delay_secs = 5
bootstrap_count = 5

# ============================================================================
# Recovery
# ============================================================================
[recovery]
enabled = true
delay_secs = 5
# max_consecutive = 3

# ============================================================================
# State Management
# ============================================================================
[state]
enable_checkpointing = true
checkpoint_path = "gallery-export-state.json"

# ============================================================================
# Logging
# ============================================================================
[logging]
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
