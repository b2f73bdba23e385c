//! Error types for formurl-sync values.

use thiserror::Error;

/// Errors that can occur when building schemas and values from text.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Field kind name is not one of `scalar`, `dateRange`, `array`
    #[error("unknown field kind: {0}")]
    UnknownKind(String),

    /// Text is not a `YYYY-MM-DD` calendar date
    #[error("invalid date: {0}")]
    InvalidDate(String),
}
