//! Shared error type across roomwire crates.

use thiserror::Error;

/// Stable error kinds. Used as WebSocket close reasons and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid input / malformed message.
    BadRequest,
    /// Identity already held by a live member of the room.
    IdentityTaken,
    /// Frame or identity exceeds the configured limit.
    PayloadTooLarge,
    /// Unsupported config or protocol version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ErrorKind {
    /// String representation used in close frames and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::IdentityTaken => "IDENTITY_TAKEN",
            ErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorKind::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("identity already in room: {0}")]
    IdentityTaken(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::BadRequest(_) => ErrorKind::BadRequest,
            RelayError::IdentityTaken(_) => ErrorKind::IdentityTaken,
            RelayError::PayloadTooLarge => ErrorKind::PayloadTooLarge,
            RelayError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            RelayError::Internal(_) => ErrorKind::Internal,
        }
    }
}
