//! Error types for table and settings files.
//!
//! These cover failures that happen before a table document exists: the file
//! cannot be read or is not valid JSON/YAML. Problems inside a well-formed
//! document are reported as [`LoadIssue`](crate::LoadIssue)s instead.

use thiserror::Error;

/// Errors that can occur while reading table or settings files.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Settings are well-formed but unusable (e.g., no tables path).
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
