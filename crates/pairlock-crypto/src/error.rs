//! Error taxonomy for the handshake, key derivation and secure channel.
//!
//! Every failure inside the protocol core maps onto one of five kinds. The
//! host boundary collapses all of them into the same "no result" signal, so
//! the distinction only matters for logging and tests.

use thiserror::Error;

use crate::handshake::SessionStatus;

/// Errors produced by the protocol core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PakeError {
    /// Malformed transport encoding or a buffer of the wrong length.
    #[error("encoding error: {reason}")]
    Encoding {
        /// What was wrong with the input
        reason: &'static str,
    },

    /// Handshake message carries an invalid or identity group element.
    #[error("invalid handshake message: {reason}")]
    InvalidMessage {
        /// Which check rejected the message
        reason: &'static str,
    },

    /// Handshake operation invoked out of order.
    #[error("invalid session state: cannot {operation} from {status:?}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// Status of the session when it was attempted
        status: SessionStatus,
    },

    /// AEAD tag verification failed.
    #[error("authentication failed")]
    Authentication,

    /// Randomness source or primitive failure. Never retried.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PakeError {
    /// Taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::InvalidMessage { .. } => ErrorKind::InvalidMessage,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::Authentication => ErrorKind::Authentication,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Coarse error category, shared by every layer built on the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed encoding or wrong-length buffer
    Encoding,
    /// Invalid or identity group element
    InvalidMessage,
    /// Operation invoked out of the allowed order
    InvalidState,
    /// AEAD verification failure
    Authentication,
    /// Randomness or primitive failure
    Internal,
}
