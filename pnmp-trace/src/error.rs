//! Error types for trace rendering

use thiserror::Error;

/// Trace engine error types
#[derive(Debug, Error)]
pub enum TraceError {
    /// Writing to the display or capture sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration values are inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TraceError>;
