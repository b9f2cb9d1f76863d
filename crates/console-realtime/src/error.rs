//! Error types for the realtime channel

use thiserror::Error;

/// Realtime channel error type
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// Frame was not a valid JSON message
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}

/// Result type for the realtime channel
pub type RealtimeResult<T> = Result<T, RealtimeError>;
