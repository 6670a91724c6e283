//! Common error types for RQC

use thiserror::Error;

/// Common result type for RQC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across RQC crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model artifact could not be loaded or evaluated
    #[error("Model error: {0}")]
    Model(String),

    /// Uploaded file is not a supported spreadsheet
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    /// Spreadsheet could not be parsed or lacks the requirement column
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists (e.g. duplicate username)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
