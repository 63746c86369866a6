//! Error types for dimlake
//!
//! This module defines the error hierarchy for the whole job.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Failures propagate fail-fast: the job has no retry logic because every
//! output path is fully overwritten, so a rerun from scratch is always safe.

use thiserror::Error;

/// The main error type for dimlake
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Storage unreachable at '{path}': {message}")]
    StorageUnreachable { path: String, message: String },

    #[error("Invalid storage path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("No input files matched glob '{glob}'")]
    NoInputFiles { glob: String },

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Schema-invalid record in '{path}': {message}")]
    SchemaInvalid { path: String, message: String },

    #[error("Column '{column}' not found in relation")]
    ColumnNotFound { column: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Write failed at '{path}': {message}")]
    WriteFailed { path: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a storage-unreachable error with path context
    pub fn storage(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageUnreachable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-path error
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a schema-invalid error with path context
    pub fn schema_invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a column-not-found error
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Create a write-failed error with path context
    pub fn write_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for dimlake
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
