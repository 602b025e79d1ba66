//! Error types for TankTrack core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages. Storage *corruption* never surfaces here,
//! because the store adapter absorbs it with a fallback and a log line.
//! Storage *write* failures do surface: the caller keeps its in-memory
//! state and should tell the user the edit may not survive a reload.

use thiserror::Error;

/// Result type alias for TankTrack operations.
pub type Result<T> = std::result::Result<T, TankError>;

/// Core error type for TankTrack operations.
#[derive(Debug, Error)]
pub enum TankError {
    /// Durable store write failure (the in-memory state is retained)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation rejected because it would clobber the default project
    #[error("The default project is protected: {0}")]
    ProtectedProject(String),

    /// Recommendation engine failure (network, timeout, schema)
    #[error("Engine error: {0}")]
    Engine(String),
}

impl From<std::io::Error> for TankError {
    fn from(err: std::io::Error) -> Self {
        TankError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for TankError {
    fn from(err: serde_json::Error) -> Self {
        TankError::Validation(err.to_string())
    }
}

impl From<reqwest::Error> for TankError {
    fn from(err: reqwest::Error) -> Self {
        TankError::Engine(err.to_string())
    }
}
