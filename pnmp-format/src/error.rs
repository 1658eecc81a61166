//! Error types for PNMP scanning

use thiserror::Error;

/// Scanner error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The quoted key text does not occur anywhere in the object.
    #[error("Key not found: '{0}'")]
    KeyNotFound(String),
    /// The key text was found but no colon follows it.
    #[error("No colon after key '{0}'")]
    MissingColon(String),
    /// The key resolved, but its value does not open with `[`.
    #[error("Value of '{0}' is not an array")]
    NotAnArray(String),
    /// No further element could be found in an array.
    #[error("No further array element")]
    NoElement,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ScanError>;
