//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parser error
    #[error("Parser error: {0}")]
    ParseError(#[from] canvass_parser::ParseError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] canvass_runtime::RuntimeError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No survey with this slug
    #[error("Survey not found: {0}")]
    SurveyNotFound(String),

    /// No segment with this name
    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    /// Definitions failed authoring validation
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = SdkError::ConfigError("no survey files".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("no survey files"));
    }

    #[test]
    fn test_not_found_errors() {
        let error = SdkError::SurveyNotFound("diet".to_string());
        assert_eq!(error.to_string(), "Survey not found: diet");

        let error = SdkError::SegmentNotFound("editors".to_string());
        assert_eq!(error.to_string(), "Segment not found: editors");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.to_string().contains("File not found"));
    }

    #[test]
    fn test_runtime_error_conversion() {
        let runtime_error = canvass_runtime::RuntimeError::InvalidPage("x".to_string());
        let sdk_error: SdkError = runtime_error.into();
        assert!(matches!(sdk_error, SdkError::RuntimeError(_)));
    }

    #[test]
    fn test_error_debug_format() {
        let error = SdkError::InvalidDefinition("diet.colour: bad".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("InvalidDefinition"));
    }
}
