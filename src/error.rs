//! Errors raised by configuration lookups, validation and parsing

use thiserror::Error;

/// Errors that can occur when reading or updating the configuration
#[derive(Error, Debug)]
pub enum Error {
    /// The requested mode key does not exist in the current snapshot
    #[error("mode `{0}` not found")]
    ModeNotFound(String),
    /// No winner gating threshold is configured for the mode key
    #[error("no winner gating threshold for mode `{0}`")]
    ThresholdNotFound(String),
    /// A merged snapshot violates the configuration invariants
    #[error("invalid configuration: {0}")]
    InvalidConfig(garde::Report),
    /// An incoming request payload failed validation
    #[error("invalid request: {0}")]
    InvalidRequest(garde::Report),
    /// Override or request JSON could not be parsed
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}
