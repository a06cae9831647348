//! Error types for Cadencer
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Cadencer
#[derive(Debug, Error)]
pub enum CadencerError {
    /// Client not found in the roster
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Client is missing required setup (locations, questions)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One or more question lines failed validation
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The slot space produced no candidate - a slot-space definition bug
    #[error("Slot space exhausted: no assignable slot")]
    SlotSpaceExhausted,

    /// Content generation pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Cadencer operations
pub type Result<T> = std::result::Result<T, CadencerError>;
