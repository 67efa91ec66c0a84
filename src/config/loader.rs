//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{ExporterConfig, ResolveStrategy, SurfaceTarget};
use crate::domain::errors::ExporterError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ExporterConfig
/// 4. Applies environment variable overrides (GALLERY_EXPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use gallery_export::config::loader::load_config;
///
/// let config = load_config("gallery-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ExporterConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExporterError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExporterError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<ExporterConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ExporterConfig = toml::from_str(&contents)
        .map_err(|e| ExporterError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ExporterError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ExporterError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExporterError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Applies environment variable overrides using the GALLERY_EXPORT_* prefix
///
/// Variables follow the pattern `GALLERY_EXPORT_<SECTION>_<KEY>`, for example
/// `GALLERY_EXPORT_WEBDRIVER_URL` or `GALLERY_EXPORT_EXPORT_BATCH_SIZE`.
/// Unparseable numeric values are ignored.
fn apply_env_overrides(config: &mut ExporterConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("GALLERY_EXPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parse("GALLERY_EXPORT_APPLICATION_NON_INTERACTIVE") {
        config.application.non_interactive = val;
    }

    // Surface overrides
    if let Ok(val) = std::env::var("GALLERY_EXPORT_SURFACE_TARGET") {
        config.surface.target = match val.to_lowercase().as_str() {
            "webdriver" => SurfaceTarget::WebDriver,
            "simulated" => SurfaceTarget::Simulated,
            other => {
                return Err(ExporterError::Configuration(format!(
                    "Invalid GALLERY_EXPORT_SURFACE_TARGET '{other}'. Must be one of: webdriver, simulated"
                )))
            }
        };
    }

    // WebDriver overrides
    if let Ok(val) = std::env::var("GALLERY_EXPORT_WEBDRIVER_URL") {
        config.webdriver.url = val;
    }
    if let Ok(val) = std::env::var("GALLERY_EXPORT_WEBDRIVER_SESSION_ID") {
        config.webdriver.session_id = Some(val);
    }
    if let Ok(val) = std::env::var("GALLERY_EXPORT_WEBDRIVER_USER_DATA_DIR") {
        config.webdriver.user_data_dir = Some(val);
    }
    if let Some(val) = env_parse("GALLERY_EXPORT_WEBDRIVER_REQUEST_TIMEOUT_SECONDS") {
        config.webdriver.request_timeout_seconds = val;
    }

    // List overrides
    if let Ok(val) = std::env::var("GALLERY_EXPORT_LIST_START_URL") {
        config.list.start_url = val;
    }
    if let Ok(val) = std::env::var("GALLERY_EXPORT_LIST_ROOT_URL") {
        config.list.root_url = val;
    }

    // Traversal overrides
    if let Ok(val) = std::env::var("GALLERY_EXPORT_TRAVERSAL_STRATEGY") {
        config.traversal.strategy = match val.to_lowercase().as_str() {
            "contiguous" => ResolveStrategy::Contiguous,
            "positional" => ResolveStrategy::Positional,
            other => {
                return Err(ExporterError::Configuration(format!(
                    "Invalid GALLERY_EXPORT_TRAVERSAL_STRATEGY '{other}'. Must be one of: contiguous, positional"
                )))
            }
        };
    }
    if let Some(val) = env_parse("GALLERY_EXPORT_TRAVERSAL_WINDOW_CAP") {
        config.traversal.window_cap = val;
    }

    // Export overrides
    if let Some(val) = env_parse("GALLERY_EXPORT_EXPORT_START_INDEX") {
        config.export.start_index = val;
    }
    if let Some(val) = env_parse("GALLERY_EXPORT_EXPORT_BATCH_SIZE") {
        config.export.batch_size = val;
    }
    if let Some(val) = env_parse("GALLERY_EXPORT_EXPORT_MAX_ATTEMPTS") {
        config.export.max_attempts = val;
    }

    // State overrides
    if let Some(val) = env_parse("GALLERY_EXPORT_STATE_ENABLE_CHECKPOINTING") {
        config.state.enable_checkpointing = val;
    }
    if let Ok(val) = std::env::var("GALLERY_EXPORT_STATE_CHECKPOINT_PATH") {
        config.state.checkpoint_path = val;
    }

    // Logging overrides
    if let Some(val) = env_parse("GALLERY_EXPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("GALLERY_EXPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("GALLERY_LOADER_TEST_VAR", "http://localhost:4444");
        let input = "url = \"${GALLERY_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result.trim_end(), "url = \"http://localhost:4444\"");
        std::env::remove_var("GALLERY_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("GALLERY_LOADER_MISSING_VAR");
        let input = "url = \"${GALLERY_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("GALLERY_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("GALLERY_LOADER_COMMENTED_VAR");
        let input = "# url = \"${GALLERY_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-gallery-export.toml");
        assert!(matches!(result, Err(ExporterError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[surface]
target = "simulated"

[simulated]
sections = [10, 20]
page_size = 15

[traversal]
strategy = "positional"
window_cap = 60

[export]
batch_size = 20
max_batches = 3
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.surface.target, SurfaceTarget::Simulated);
        assert_eq!(config.simulated.sections, vec![10, 20]);
        assert_eq!(config.traversal.strategy, ResolveStrategy::Positional);
        assert_eq!(config.export.batch_size, 20);
        assert_eq!(config.export.max_batches, Some(3));
        // Untouched sections keep their defaults
        assert_eq!(config.export.max_attempts, 3);
        assert_eq!(config.list.item_id_prefix, "gallerySelector");
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.webdriver.url, "http://localhost:9515");
        assert_eq!(config.traversal.window_cap, 105);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = parse_config("[export]\nbatch_size = 0\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("batch_size"));
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        let result = parse_config("[export\nbatch_size = 1");
        assert!(result.unwrap_err().to_string().contains("Failed to parse TOML"));
    }
}
