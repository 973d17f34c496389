use std::io;
use std::time::Duration;
use thiserror::Error;

/// Custom error types for the TSIP client
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Framing error: expected ETX after DLE, got {got:#04x}")]
    Framing {
        /// Byte found where ETX was required
        got: u8,
    },

    #[error("Truncated {kind} packet: need {needed} bytes, have {available}")]
    Truncated {
        /// Human readable packet kind
        kind: &'static str,
        /// Bytes required by the layout
        needed: usize,
        /// Bytes actually present
        available: usize,
    },

    #[error("Unknown packet type: {}", hex::encode(.leading))]
    UnmatchedKind {
        /// Leading bytes of the unrecognised frame
        leading: Vec<u8>,
    },

    #[error("Frame overflow: {length} bytes exceeds limit of {limit}")]
    Overflow {
        /// Length of the frame on the wire, after de-stuffing
        length: usize,
        /// Configured frame limit
        limit: usize,
    },

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {0:?} waiting for data")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new framing error
    pub fn framing(got: u8) -> Self {
        Error::Framing { got }
    }

    /// Creates a new truncation error
    pub fn truncated(kind: &'static str, needed: usize, available: usize) -> Self {
        Error::Truncated { kind, needed, available }
    }

    /// Creates a new unmatched kind error from the head of a frame
    pub fn unmatched(frame: &[u8]) -> Self {
        Error::UnmatchedKind {
            leading: frame.iter().take(2).copied().collect(),
        }
    }

    /// Creates a new overflow error
    pub fn overflow(length: usize, limit: usize) -> Self {
        Error::Overflow { length, limit }
    }

    /// Creates a new registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Error::Registry(msg.into())
    }

    /// Creates a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Error::Network(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether the read loop may drop the offending frame and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Truncated { .. } | Error::UnmatchedKind { .. } | Error::Overflow { .. }
        )
    }
}
