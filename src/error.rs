//! Error types for address parsing

use thiserror::Error;

/// Errors that can occur during address parsing
///
/// Malformed address lists are never an error: the parser always degrades
/// to a best-effort reading. Only input that is not text at all is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The caller supplied something that is not text
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for address parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;
