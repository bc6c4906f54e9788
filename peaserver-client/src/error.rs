//! Client-side failures. Every request resolves to a response mapping or
//! exactly one of these; nothing panics across the async boundary.

use std::time::Duration;

/// Why a request did not produce a response mapping.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid caller-supplied input (zero timeout, unbound address, bad
    /// header name). Rejected before any network I/O.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Connect, DNS, or mid-exchange I/O fault.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
    /// No reply within the caller's timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The reply arrived but could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// Well-formed error envelope from the server.
    #[error("server error ({kind}): {message}")]
    Server { kind: String, message: String },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Configuration(_) => ErrorKind::Configuration,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Timeout(_) => ErrorKind::Timeout,
            ClientError::Protocol(_) => ErrorKind::Protocol,
            ClientError::Server { .. } => ErrorKind::Server,
        }
    }
}

/// Coarse error classification, stable for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Timeout,
    Protocol,
    Server,
}
