//! Error types for the control socket

use std::path::PathBuf;
use thiserror::Error;

/// Error type for control socket operations
#[derive(Debug, Error)]
pub enum SocketError {
    /// The socket is missing or nothing is listening on it
    #[error("could not connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the connected socket failed
    #[error("control socket write failed: {0}")]
    Transport(#[from] std::io::Error),

    /// Byte is not a known command code
    #[error("unknown command code: {0}")]
    UnknownCommand(u8),

    /// Byte is not a known event code
    #[error("unknown event code: {0}")]
    UnknownEvent(u8),
}

/// Result type for control socket operations
pub type Result<T> = std::result::Result<T, SocketError>;
