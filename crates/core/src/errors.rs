//! Core error types for the bhavcopy pipeline.
//!
//! Only two kinds of failure abort a run: configuration errors (the mapping
//! table or the pipeline settings are unusable) and export failures. Bad
//! rows, unresolved scrip codes and arithmetic edge cases are reported as
//! data, never through this type.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Export failed: {0}")]
    Export(String),
}

impl Error {
    /// Returns true if the error must abort the whole pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Fatal configuration problems.
///
/// These are surfaced immediately; no partial computation is attempted.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Mapping table not found: {0}")]
    MappingTableMissing(String),

    #[error("Mapping table could not be read: {0}")]
    MappingTableUnreadable(String),

    #[error("Mapping table has no '{0}' column")]
    MissingMappingColumn(String),

    #[error("Invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
}

/// Validation errors for input shape and value parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date: {0}")]
    DateParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateParse(err))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Export(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Export(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(ConfigError::InvalidValue {
            key: "pipeline config".to_string(),
            value: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_fatal() {
        let err: Error = ConfigError::MappingTableMissing("EQ_MAP_CC_*.csv".to_string()).into();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Configuration error: Mapping table not found: EQ_MAP_CC_*.csv"
        );
    }

    #[test]
    fn test_validation_errors_are_not_fatal() {
        let err: Error = ValidationError::MissingField("CLOSE".to_string()).into();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_io_error_maps_to_export() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: Error = io.into();
        assert!(matches!(err, Error::Export(_)));
    }
}
