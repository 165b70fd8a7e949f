//! Common error types for OT Assurance Twin

use std::path::PathBuf;

use thiserror::Error;

/// Common result type for OT Assurance Twin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the library and service
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file failed
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// CSV text for a named source could not be parsed
    #[error("Malformed CSV in source '{source_id}': {message}")]
    Csv { source_id: String, message: String },

    /// Reconciliation was requested without any engineering baseline records
    #[error("Engineering baseline is empty; at least one engineering record is required")]
    EmptyEngineering,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::Csv { .. } | Error::EmptyEngineering
        )
    }
}
