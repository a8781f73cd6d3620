//! Error types for the media publisher.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media publisher.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Duplicate drive letter '{0}' in server configuration")]
    DuplicateDriveLetter(char),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // Export parse errors
    #[error("Failed to parse export: {0}")]
    ExportParse(String),

    // Resolution errors
    #[error("Unsupported extension '{extension}' for file: {path}")]
    UnsupportedExtension { path: String, extension: String },

    #[error("No configured server matches drive of path: {0}")]
    UnresolvedServer(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // XML errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
