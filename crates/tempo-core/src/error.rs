//! Core error types for tempo-core.
//!
//! One `thiserror` enum per concern, aggregated by [`CoreError`]. Capability
//! failures never escape the engine; they exist so the capability traits can
//! report what went wrong before the engine swallows it.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tempo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value or SQLite storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input rejected before any record was written
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session backend failures (recoverable, the caller may retry)
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A manual save was attempted below the one-minute threshold
    #[error("Session too short to save: {elapsed_ms} ms elapsed, at least one minute required")]
    SessionTooShort { elapsed_ms: u64 },

    /// Duration must be a positive number of minutes
    #[error("Invalid duration for '{field}': {value} (must be a positive number of minutes)")]
    InvalidDuration { field: String, value: u64 },

    /// Volume outside 0.0..=1.0
    #[error("Invalid alarm volume {0}: must be between 0.0 and 1.0")]
    InvalidVolume(f64),

    /// Adjusting or manually saving the countdown while the alarm rings
    #[error("Not permitted while the alarm is ringing; acknowledge it first")]
    AlarmRinging,
}

/// Failure reported by a platform capability (audio, notification, wake lock).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("{0} is not available on this platform")]
    Unavailable(&'static str),

    #[error("{0} permission denied")]
    Denied(&'static str),

    #[error("{name} failed: {message}")]
    Failed { name: &'static str, message: String },
}

/// Session backend errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to write session: {0}")]
    WriteFailed(String),

    #[error("Failed to read sessions: {0}")]
    ReadFailed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseLocked => {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
