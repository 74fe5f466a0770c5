//! Error types for the settings crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The platform has no configuration directory.
    #[error("Config directory not available")]
    ConfigDirectory,

    /// The settings file could not be read or written.
    #[error("Settings file {path}: {source}")]
    File {
        /// The settings file.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The settings file is not a JSON object.
    #[error("Corrupted settings file: {0}")]
    Corrupted(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupted_display() {
        let err = SettingsError::Corrupted("not an object".to_string());
        assert_eq!(err.to_string(), "Corrupted settings file: not an object");
    }

    #[test]
    fn test_file_error_display() {
        let err = SettingsError::File {
            path: PathBuf::from("/tmp/settings.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "Settings file /tmp/settings.json: missing");
    }
}
