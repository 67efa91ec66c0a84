//! Domain error types
//!
//! This module defines the error hierarchy for the exporter.
//! Errors are domain-specific and don't expose third-party types.
//!
//! Reaching the end of the list is deliberately *not* an error; it is reported
//! through [`crate::core::cursor::Resolution::EndOfList`].

use thiserror::Error;

/// Main exporter error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Automation surface errors
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Retry budget exhausted or an unexpected failure that requires recovery
    #[error("Fatal error: {0}")]
    Fatal(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// State management errors
    #[error("State management error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The run was interrupted by the user
    #[error("Interrupted: {0}")]
    Interrupted(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ExporterError {
    /// Whether the failure is a transient UI condition worth polling through
    pub fn is_transient(&self) -> bool {
        matches!(self, ExporterError::Surface(e) if e.is_transient())
    }
}

/// Automation surface errors
///
/// Errors raised while talking to the remote list surface.
/// These errors don't expose the HTTP client types.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Failed to reach the automation endpoint
    #[error("Failed to connect to automation surface: {0}")]
    ConnectionFailed(String),

    /// No element matched the query
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The element reference is no longer attached to the page
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// The element exists but cannot receive input yet
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// A bounded wait expired
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The surface rejected a command
    #[error("Command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// The surface answered with something we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SurfaceError {
    /// Transient failures are expected while the list is mid-update
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SurfaceError::ElementNotFound(_)
                | SurfaceError::StaleElement(_)
                | SurfaceError::NotInteractable(_)
                | SurfaceError::Timeout(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExporterError {
    fn from(err: std::io::Error) -> Self {
        ExporterError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExporterError {
    fn from(err: serde_json::Error) -> Self {
        ExporterError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExporterError {
    fn from(err: toml::de::Error) -> Self {
        ExporterError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exporter_error_display() {
        let err = ExporterError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_surface_error_conversion() {
        let surface_err = SurfaceError::StaleElement("item-3".to_string());
        let err: ExporterError = surface_err.into();
        assert!(matches!(err, ExporterError::Surface(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_command_failed_is_not_transient() {
        let err: ExporterError = SurfaceError::CommandFailed {
            command: "click".to_string(),
            message: "unknown error".to_string(),
        }
        .into();
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "Surface error: Command failed: click - unknown error"
        );
    }

    #[test]
    fn test_fatal_is_not_transient() {
        assert!(!ExporterError::Fatal("retries exhausted".to_string()).is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: ExporterError = io_err.into();
        assert!(matches!(err, ExporterError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: ExporterError = json_err.into();
        assert!(matches!(err, ExporterError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: ExporterError = toml_err.into();
        assert!(matches!(err, ExporterError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
