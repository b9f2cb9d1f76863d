//! Error types for console access control

use thiserror::Error;

/// Access control error type
#[derive(Error, Debug)]
pub enum AccessError {
    /// Identity payload carried a `kind` that is neither platform nor org
    #[error("unrecognized actor kind: {0}")]
    UnrecognizedActor(String),

    /// Identity payload could not be decoded
    #[error("malformed actor payload: {0}")]
    MalformedActor(#[from] serde_json::Error),

    /// Page requirement table is inconsistent
    #[error("invalid page requirement for {path}: {reason}")]
    InvalidRequirement { path: String, reason: String },
}

/// Result type for access control
pub type AccessResult<T> = Result<T, AccessError>;
