//! Error types for Flint

use thiserror::Error;

/// The main error type for Flint operations
///
/// The simulation itself never fails; these errors come from loading and
/// validating scene descriptions.
#[derive(Debug, Error)]
pub enum FlintError {
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Invalid field type: {field} expected {expected}")]
    InvalidFieldType { field: String, expected: String },

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Invalid enum value: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        value: String,
        allowed: Vec<String>,
    },
}

/// Result type alias for Flint operations
pub type Result<T> = std::result::Result<T, FlintError>;

impl From<toml::de::Error> for FlintError {
    fn from(err: toml::de::Error) -> Self {
        FlintError::TomlParseError(err.to_string())
    }
}

impl FlintError {
    /// Shorthand for an `InvalidEnumValue` built from string slices
    pub fn invalid_enum(value: &str, allowed: &[&str]) -> Self {
        FlintError::InvalidEnumValue {
            value: value.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}
