//! Error types for the outbound platform boundary.

use thiserror::Error;

use crate::foundation::GroupId;

/// Errors reported by a [`PlatformClient`](crate::PlatformClient).
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The client has no live connection.
    #[error("platform client is not connected")]
    NotConnected,

    /// The platform refused the request.
    #[error("request rejected ({status}): {message}")]
    Rejected {
        /// Status code returned by the platform.
        status: u16,
        /// Message returned by the platform.
        message: String,
    },

    /// The target group does not exist or the client cannot see it.
    #[error("unknown group '{0}'")]
    UnknownGroup(GroupId),

    /// The interaction token expired before it was answered.
    #[error("interaction token expired")]
    TokenExpired,

    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type for client calls.
pub type ClientResult<T> = Result<T, ClientError>;
