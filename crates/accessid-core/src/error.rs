//! Error types for accessid.
//!
//! Identifier generation itself never fails; degraded inputs are recovered
//! locally and logged. Errors only arise when loading or saving settings.

use std::path::PathBuf;

/// Result type alias for accessid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling identifier settings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error.
    #[error("Failed to access settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("Settings parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("Settings serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A setting holds a value the engine cannot use.
    #[error("Invalid value for setting '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
