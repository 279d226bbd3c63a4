//! Core error types for stronghabit-core.
//!
//! This module defines a comprehensive error hierarchy using thiserror
//! for better error handling and reporting across the library.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for stronghabit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Worker channel errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors, shared by the local and remote backends.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Remote backend rejected a request
    #[error("Remote API error ({status}): {message}")]
    RemoteApi { status: u16, message: String },

    /// Remote backend unreachable
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// OS credential store failed
    #[error("Credential storage error: {0}")]
    Credentials(String),

    /// Remote backend selected without a stored identity
    #[error("Not authenticated: run 'stronghabit auth login' first")]
    NotAuthenticated,
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Notification delivery errors.
///
/// These are reported but never abort a cycle or reminder tick.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The surface refused notification permission
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The surface has no notification support at all
    #[error("Notifications not supported on this surface")]
    Unsupported,

    /// Delivery was attempted and failed
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Errors on the worker/foreground message channel.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// No foreground context answered a data request in time
    #[error("No response from foreground context within {timeout_secs} seconds")]
    ResponseTimeout { timeout_secs: u64 },

    /// The peer hung up
    #[error("Channel closed")]
    Closed,
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ChannelError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ChannelError::ResponseTimeout { timeout_secs: 5 }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
