//! Protocol error types.

use thiserror::Error;

/// Errors that can occur during message parsing.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Message is not valid UTF-8")]
    InvalidUtf8,
}
