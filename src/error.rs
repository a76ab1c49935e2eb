//! Error types for TableBrain
//!
//! Query-level failures are swallowed by the executor (logged, turned into
//! empty results), so the variants here cover what is left: startup and
//! shutdown of the connection, JSON decoding, and application-level misuse
//! of a key.

use thiserror::Error;

/// Result type alias using BrainError
pub type Result<T> = std::result::Result<T, BrainError>;

/// Unified error type for TableBrain operations
#[derive(Debug, Error)]
pub enum BrainError {
    // -------------------------------------------------------------------------
    // Backing Store Errors
    // -------------------------------------------------------------------------
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    // -------------------------------------------------------------------------
    // Data Structure Errors
    // -------------------------------------------------------------------------
    #[error("Key '{key}' holds a value of the wrong type for this operation")]
    WrongType { key: String },

    #[error("Value at '{key}' is not an integer")]
    NotAnInteger { key: String },

    #[error("Increment would overflow value at '{key}'")]
    Overflow { key: String },

    #[error("Index {index} out of range for list '{key}'")]
    IndexOutOfRange { key: String, index: i64 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
