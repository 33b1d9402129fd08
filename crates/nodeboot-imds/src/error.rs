//! Error types for metadata access

use std::time::Duration;
use thiserror::Error;

/// Error type for metadata operations
#[derive(Debug, Error)]
pub enum ImdsError {
    /// The request could not be sent or its body could not be read
    #[error("metadata transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint answered with an empty body
    #[error("metadata service at {0} returned an empty token")]
    EmptyToken(String),

    /// The session was used before a token was established
    #[error("metadata session has no token")]
    NoToken,

    /// The session token has outlived its TTL
    #[error("metadata token expired after {0:?}")]
    TokenExpired(Duration),

    /// Every candidate endpoint failed to establish a session
    #[error("no metadata endpoint reachable (tried {0})")]
    Unreachable(String),

    /// No candidate established a session before the deadline
    #[error("timed out after {0:?} waiting for a metadata endpoint")]
    Timeout(Duration),
}

/// Result type for metadata operations
pub type Result<T> = std::result::Result<T, ImdsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImdsError::EmptyToken("http://169.254.169.254/latest/".to_string());
        assert_eq!(
            err.to_string(),
            "metadata service at http://169.254.169.254/latest/ returned an empty token"
        );

        let err = ImdsError::Unreachable("169.254.169.254, [fd00:ec2::254]".to_string());
        assert_eq!(
            err.to_string(),
            "no metadata endpoint reachable (tried 169.254.169.254, [fd00:ec2::254])"
        );

        let err = ImdsError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "timed out after 10s waiting for a metadata endpoint");
    }
}
